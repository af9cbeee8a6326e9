//! Before, after and around hooks for suites, groups and cases
//!
//! Hooks are registered per [`EntityKind`] and run by [`Hooks::wrap`] around
//! the execution of one entity:
//!
//! 1. every `around` hook, first registered outermost, receives a
//!    continuation and decides whether to invoke it;
//! 2. the continuation runs the `before` hooks in registration order, then
//!    the body, then the `after` hooks in registration order.
//!
//! A failing hook skips the remaining hooks of its phase and its error
//! propagates. After-hooks still run when the body or a before-hook failed;
//! the first error observed is the one returned.

use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;

/// The kind of entity a hook is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Suite,
    Group,
    Case,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Suite => "suite",
            EntityKind::Group => "group",
            EntityKind::Case => "case",
        };
        f.write_str(name)
    }
}

/// When a hook runs relative to the entity's body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Before,
    After,
    Around,
}

/// Read-only description of the entity being executed, handed to hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEntity {
    pub kind: EntityKind,
    pub name: String,
    pub path: PathBuf,
}

/// Type alias for a before or after hook
pub type HookFn = Box<dyn Fn(&HookEntity) -> Result<()>>;

/// Type alias for an around hook; the second argument runs the wrapped execution
pub type AroundFn = Box<dyn Fn(&HookEntity, &mut dyn FnMut() -> Result<()>) -> Result<()>>;

enum Callback {
    Phase(HookFn),
    Around(AroundFn),
}

struct HookRegistration {
    kind: EntityKind,
    phase: Phase,
    ordinal: usize,
    callback: Callback,
}

impl fmt::Debug for HookRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistration")
            .field("kind", &self.kind)
            .field("phase", &self.phase)
            .field("ordinal", &self.ordinal)
            .finish()
    }
}

/// Ordered hook registrations for every entity kind
#[derive(Debug, Default)]
pub struct Hooks {
    registrations: Vec<HookRegistration>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook that runs before each entity of `kind`
    pub fn before<F>(mut self, kind: EntityKind, func: F) -> Self
    where
        F: Fn(&HookEntity) -> Result<()> + 'static,
    {
        self.register(kind, Phase::Before, Callback::Phase(Box::new(func)));
        self
    }

    /// Register a hook that runs after each entity of `kind`
    pub fn after<F>(mut self, kind: EntityKind, func: F) -> Self
    where
        F: Fn(&HookEntity) -> Result<()> + 'static,
    {
        self.register(kind, Phase::After, Callback::Phase(Box::new(func)));
        self
    }

    /// Register a hook that wraps each entity of `kind`
    ///
    /// The hook must call the continuation for the entity to execute.
    pub fn around<F>(mut self, kind: EntityKind, func: F) -> Self
    where
        F: Fn(&HookEntity, &mut dyn FnMut() -> Result<()>) -> Result<()> + 'static,
    {
        self.register(kind, Phase::Around, Callback::Around(Box::new(func)));
        self
    }

    fn register(&mut self, kind: EntityKind, phase: Phase, callback: Callback) {
        let ordinal = self.registrations.len();
        self.registrations.push(HookRegistration {
            kind,
            phase,
            ordinal,
            callback,
        });
    }

    /// Run `body` for `entity`, surrounded by the hooks registered for `kind`
    pub fn wrap<F>(&self, kind: EntityKind, entity: &HookEntity, body: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        let mut body = Some(body);
        let mut inner = || match body.take() {
            Some(body) => self.run_phases(kind, entity, body),
            None => Ok(()),
        };

        let arounds: Vec<&AroundFn> = self
            .registrations
            .iter()
            .filter(|r| r.kind == kind)
            .filter_map(|r| match &r.callback {
                Callback::Around(func) => Some(func),
                Callback::Phase(_) => None,
            })
            .collect();

        self.run_around(&arounds, entity, &mut inner)
    }

    fn run_around(
        &self,
        arounds: &[&AroundFn],
        entity: &HookEntity,
        inner: &mut dyn FnMut() -> Result<()>,
    ) -> Result<()> {
        match arounds.split_first() {
            None => inner(),
            Some((hook, rest)) => hook(entity, &mut || self.run_around(rest, entity, &mut *inner)),
        }
    }

    fn run_phases<F>(&self, kind: EntityKind, entity: &HookEntity, body: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        let result = self
            .run_callbacks(kind, Phase::Before, entity)
            .and_then(|()| body());
        let after = self.run_callbacks(kind, Phase::After, entity);
        result.and(after)
    }

    fn run_callbacks(&self, kind: EntityKind, phase: Phase, entity: &HookEntity) -> Result<()> {
        for registration in self
            .registrations
            .iter()
            .filter(|r| r.kind == kind && r.phase == phase)
        {
            if let Callback::Phase(func) = &registration.callback {
                log::trace!(
                    "Running {:?} hook #{} for {} '{}'",
                    phase,
                    registration.ordinal,
                    kind,
                    entity.name
                );
                func(entity).map_err(|err| match err {
                    Error::Hook { .. } => err,
                    other => Error::hook_error(kind, &entity.name, other.to_string()),
                })?;
            }
        }
        Ok(())
    }
}
