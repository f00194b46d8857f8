use std::fmt;

use anchor_lang::prelude::*;

use crate::config::GuardConfig;
use crate::derivation::DerivedAddressSpec;
use crate::error::ErrorCode;
use crate::identity::ResourceHandle;
use crate::rules;
use crate::state::{GuardedAccount, Verified};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rule {
    Signer,
    Owner,
    DerivedAddress,
    CalleeProgram,
}

impl Rule {
    /// Evaluation order. Cheapest and most fundamental first.
    pub const ORDER: [Rule; 4] = [
        Rule::Signer,
        Rule::Owner,
        Rule::DerivedAddress,
        Rule::CalleeProgram,
    ];
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::Signer => "signer",
            Rule::Owner => "owner",
            Rule::DerivedAddress => "derived-address",
            Rule::CalleeProgram => "callee-program",
        };
        f.write_str(name)
    }
}

/// The rules one operation requires, declared once at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub operation: &'static str,
    pub call_site: Option<&'static str>,
    rules: &'static [Rule],
}

impl Policy {
    pub const fn new(operation: &'static str, rules: &'static [Rule]) -> Self {
        Self {
            operation,
            call_site: None,
            rules,
        }
    }

    /// Names the allow-list the callee-program rule checks against.
    pub const fn with_call_site(mut self, call_site: &'static str) -> Self {
        self.call_site = Some(call_site);
        self
    }

    pub fn requires(&self, rule: Rule) -> bool {
        self.rules.contains(&rule)
    }

    /// Declared rules in evaluation order, whatever order they were declared in.
    pub fn rules(&self) -> impl Iterator<Item = Rule> + '_ {
        Rule::ORDER.into_iter().filter(|rule| self.requires(*rule))
    }
}

/// The handles an operation presents to the guard.
///
/// `authority` is checked by the signer rule, `resource` by the owner and
/// derived-address rules, `callee` by the callee-program rule. When
/// `derivation` is absent the derived-address rule uses the seeds and bump
/// stored in the opened record.
#[derive(Debug, Default, Clone)]
pub struct AccessRequest<'a> {
    pub authority: Option<&'a ResourceHandle>,
    pub resource: Option<&'a ResourceHandle>,
    pub callee: Option<&'a ResourceHandle>,
    pub derivation: Option<DerivedAddressSpec>,
}

impl<'a> AccessRequest<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authority(mut self, handle: &'a ResourceHandle) -> Self {
        self.authority = Some(handle);
        self
    }

    pub fn resource(mut self, handle: &'a ResourceHandle) -> Self {
        self.resource = Some(handle);
        self
    }

    pub fn callee(mut self, handle: &'a ResourceHandle) -> Self {
        self.callee = Some(handle);
        self
    }

    pub fn derivation(mut self, spec: DerivedAddressSpec) -> Self {
        self.derivation = Some(spec);
        self
    }
}

/// Proof that every rule of a policy passed.
#[derive(Debug)]
pub struct Clearance<T> {
    operation: &'static str,
    record: Option<Verified<T>>,
}

impl<T> Clearance<T> {
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// The record the owner rule opened. Policies without the owner rule
    /// never produce one.
    pub fn into_record(self) -> Result<Verified<T>> {
        self.record.ok_or_else(|| error!(ErrorCode::MissingGuardInput))
    }
}

/// Runs policies against requests.
///
/// Holds only the immutable configuration it was built with, so one guard
/// can serve any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct Guard {
    config: GuardConfig,
}

impl Default for Guard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

impl Guard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.config.program_id
    }

    /// Evaluates `policy` once against `request`.
    ///
    /// Exactly the declared rules run, in `Rule::ORDER`, and the first
    /// failure is returned as is. Later rules are not evaluated, so the error
    /// says nothing about whether they would have passed.
    pub fn enforce<T: GuardedAccount>(
        &self,
        policy: &Policy,
        request: &AccessRequest<'_>,
    ) -> Result<Clearance<T>> {
        let mut record: Option<Verified<T>> = None;

        for rule in policy.rules() {
            if let Err(error) = self.evaluate(rule, policy, request, &mut record) {
                msg!("{} rejected by {} rule", policy.operation, rule);
                return Err(error);
            }
        }

        Ok(Clearance {
            operation: policy.operation,
            record,
        })
    }

    fn evaluate<T: GuardedAccount>(
        &self,
        rule: Rule,
        policy: &Policy,
        request: &AccessRequest<'_>,
        record: &mut Option<Verified<T>>,
    ) -> Result<()> {
        match rule {
            Rule::Signer => rules::signer::check(required(request.authority)?),
            Rule::Owner => {
                let resource = required(request.resource)?;
                *record = Some(rules::owner::open(resource, self.program_id())?);
                Ok(())
            }
            Rule::DerivedAddress => {
                let resource = required(request.resource)?;
                let spec = match (&request.derivation, record.as_ref()) {
                    (Some(spec), _) => spec.clone(),
                    (None, Some(opened)) => opened
                        .derivation(self.program_id())
                        .ok_or_else(|| error!(ErrorCode::MissingGuardInput))?,
                    (None, None) => return err!(ErrorCode::MissingGuardInput),
                };
                rules::derived_address::check(resource, &spec)
            }
            Rule::CalleeProgram => {
                let callee = required(request.callee)?;
                let call_site = policy
                    .call_site
                    .ok_or_else(|| error!(ErrorCode::UnknownCallSite))?;
                rules::callee::check(callee, self.config.allow_list(call_site)?)
            }
        }
    }
}

fn required<'a>(handle: Option<&'a ResourceHandle>) -> Result<&'a ResourceHandle> {
    handle.ok_or_else(|| error!(ErrorCode::MissingGuardInput))
}
