//! Multi-round processing.
//!
//! A host runs the [Driver] once per round of its own build. Declarations
//! whose dependencies are not resolvable yet are deferred to the next round,
//! every other declaration is either generated or reported as invalid. Both
//! outcomes are final for the lifetime of the driver.

use hashbrown::HashSet;

use crate::config::Markers;
use crate::emit;
use crate::error::Error;
use crate::host::{CodeGenerator, Reporter, Resolver};
use crate::types::ClassName;
use crate::validate::{self, Rejection, Validator};

/// A declaration that was deferred to a later round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deferred {
    pub name: ClassName,
    /// The spellings of the references that could not be resolved.
    pub unresolved: Vec<String>,
}

/// The outcome of a single round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// The round number, starting at 1.
    pub round: usize,
    /// Declarations a factory was generated for.
    pub generated: Vec<ClassName>,
    /// Declarations deferred to the next round.
    pub deferred: Vec<Deferred>,
    /// Declarations that were reported as invalid.
    pub failed: Vec<ClassName>,
}

/// Drives validation and generation across rounds.
///
/// ```rust
/// use assisted_factory::{Diagnostic, Driver, GeneratedFile, SymbolTable};
///
/// let symbols = SymbolTable::new();
/// let mut files = Vec::<GeneratedFile>::new();
/// let mut diagnostics = Vec::<Diagnostic>::new();
///
/// let mut driver = Driver::default();
/// let report = driver.process(&symbols, &mut files, &mut diagnostics)?;
///
/// assert_eq!(report.round, 1);
/// assert!(report.generated.is_empty());
/// assert!(driver.finish().is_empty());
/// # Ok::<_, assisted_factory::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Driver {
    markers: Markers,
    round: usize,
    emitted: HashSet<ClassName>,
    failed: HashSet<ClassName>,
    pending: Vec<Deferred>,
}

impl Driver {
    pub fn new(markers: Markers) -> Self {
        Self {
            markers,
            round: 0,
            emitted: HashSet::new(),
            failed: HashSet::new(),
            pending: Vec::new(),
        }
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Run a single round.
    ///
    /// Only infrastructure failures, like failing to write a generated file,
    /// are returned as errors. Invalid declarations are reported through
    /// `reporter`.
    pub fn process(
        &mut self,
        resolver: &dyn Resolver,
        generator: &mut dyn CodeGenerator,
        reporter: &mut dyn Reporter,
    ) -> Result<RoundReport, Error> {
        self.round += 1;

        let span = tracing::debug_span!("round", round = self.round);
        let _enter = span.enter();

        let mut report = RoundReport {
            round: self.round,
            ..RoundReport::default()
        };

        let mut seen = HashSet::new();
        let mut written = Ok(());

        for class in resolver.symbols_with_annotation(&self.markers.contributes_assisted_factory) {
            let name = class.name();

            if !seen.insert(name.clone()) {
                continue;
            }

            if self.emitted.contains(name) || self.failed.contains(name) {
                tracing::trace!(class = %name, "already processed");
                continue;
            }

            let unresolved = validate::unresolved_references(class, resolver, &self.markers);

            if !unresolved.is_empty() {
                tracing::debug!(class = %name, ?unresolved, "deferring");

                report.deferred.push(Deferred {
                    name: name.clone(),
                    unresolved,
                });

                continue;
            }

            match Validator::new(&self.markers, resolver, class).validate() {
                Ok(plan) => {
                    let file = emit::render(&plan, &self.markers);

                    // Stop at the first failed write, but keep the round's
                    // state in line with what was done before it.
                    if let Err(error) = generator.write(&file) {
                        tracing::error!(class = %name, %error, "failed to write factory");
                        written = Err(error);
                        break;
                    }

                    tracing::debug!(class = %name, factory = %file.qualified_name(), "generated");
                    self.emitted.insert(name.clone());
                    report.generated.push(name.clone());
                }
                Err(Rejection::Unresolved(unresolved)) => {
                    tracing::debug!(class = %name, ?unresolved, "deferring");

                    report.deferred.push(Deferred {
                        name: name.clone(),
                        unresolved,
                    });
                }
                Err(Rejection::Invalid(error)) => {
                    tracing::debug!(class = %name, %error, "invalid");
                    reporter.error(&error.site(), &error.to_string());
                    self.failed.insert(name.clone());
                    report.failed.push(name.clone());
                }
            }
        }

        self.pending = report.deferred.clone();
        written?;
        Ok(report)
    }

    /// Declarations deferred by the last round.
    pub fn pending(&self) -> &[Deferred] {
        &self.pending
    }

    /// Forget everything processed so far, for a new full build.
    pub fn reset(&mut self) {
        self.round = 0;
        self.emitted.clear();
        self.failed.clear();
        self.pending.clear();
    }

    /// End processing, returning the declarations that were never resolved.
    pub fn finish(&mut self) -> Vec<Deferred> {
        let pending = std::mem::take(&mut self.pending);

        for deferred in &pending {
            tracing::warn!(
                class = %deferred.name,
                unresolved = ?deferred.unresolved,
                "unresolved references remain after the last round"
            );
        }

        pending
    }
}
