//! The resolution pass
//!
//! One logical unit of work per deployment: parse the catalog, scan the
//! tree, reconcile types, fan out fetch-or-generate calls, substitute.
//! Scanning and reconciliation are synchronous and side-effect free; the
//! store calls are the only concurrency unit.

use std::collections::BTreeMap;
use std::sync::Arc;

use manifold_domain::{
    Manifest, ResolvedValue, SubstitutionMap, VariableCatalog, VariableIdentity, VariableSpec,
    VariableType,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::ResolutionError;
use crate::interpolator::interpolate;
use crate::ports::{ConfigServerClient, ConfigServerError};
use crate::reconciler::{reconcile, ConsumerType};

/// Per-pass parameters. Director and deployment names are explicit inputs
/// of the pass, never ambient state.
#[derive(Debug, Clone)]
pub struct PassConfig {
    /// Director name used to namespace relative variable names.
    pub director: String,

    /// Deployment name used to namespace relative variable names.
    pub deployment: String,

    /// Upper bound on concurrent in-flight store requests.
    pub max_in_flight: usize,
}

impl PassConfig {
    /// Default bound on concurrent store requests.
    pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

    /// Creates a pass configuration with the default concurrency bound.
    pub fn new(director: impl Into<String>, deployment: impl Into<String>) -> Self {
        Self {
            director: director.into(),
            deployment: deployment.into(),
            max_in_flight: Self::DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Overrides the concurrency bound.
    #[must_use]
    pub const fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }
}

/// Resolves every variable reference of one deployment manifest against
/// the config server.
pub struct ResolutionPass<C> {
    client: Arc<C>,
    config: PassConfig,
}

impl<C: ConfigServerClient + 'static> ResolutionPass<C> {
    /// Creates a pass bound to a store client and pass parameters.
    pub fn new(client: Arc<C>, config: PassConfig) -> Self {
        Self { client, config }
    }

    /// Runs one pass and returns the substituted manifest.
    ///
    /// Local errors (schema, reconciliation conflict) abort before any
    /// store call is made. A store failure for any identity aborts the
    /// pass; values already resolved for other identities are discarded
    /// with it. No partial manifest is ever returned.
    ///
    /// # Errors
    ///
    /// Any [`ResolutionError`]; all of them are fatal for the pass.
    pub async fn run(
        &self,
        manifest: &Manifest,
        consumer_types: &[ConsumerType],
    ) -> Result<Manifest, ResolutionError> {
        let catalog = VariableCatalog::parse(manifest.variables_section())?;
        let references = manifest.scan()?;
        let specs = reconcile(
            &references,
            &catalog,
            consumer_types,
            &self.config.director,
            &self.config.deployment,
        )?;

        info!(
            deployment = %self.config.deployment,
            identities = specs.len(),
            references = references.len(),
            "resolving manifest variables"
        );

        let substitutions = self.resolve_specs(specs).await?;
        interpolate(
            manifest,
            &substitutions,
            &self.config.director,
            &self.config.deployment,
        )
    }

    /// Fans out fetch-or-generate calls, one task per unique identity.
    /// Requests sharing an identity are coalesced by construction: the
    /// spec map holds one entry per identity, so the store sees at most
    /// one generate call per identity per pass.
    async fn resolve_specs(
        &self,
        specs: BTreeMap<VariableIdentity, VariableSpec>,
    ) -> Result<SubstitutionMap, ResolutionError> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight.max(1)));
        let mut tasks = JoinSet::new();

        for spec in specs.into_values() {
            let client = Arc::clone(&self.client);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ResolutionError::Internal(e.to_string()))?;
                fetch_or_generate(client.as_ref(), &spec).await
            });
        }

        let mut substitutions = SubstitutionMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(resolved)) => {
                    substitutions.insert(resolved.identity.clone(), resolved);
                }
                Ok(Err(err)) => {
                    tasks.abort_all();
                    return Err(err);
                }
                Err(join_err) => {
                    tasks.abort_all();
                    return Err(ResolutionError::Internal(join_err.to_string()));
                }
            }
        }
        Ok(substitutions)
    }
}

/// Fetch-or-generate for one identity. An existing value is returned
/// unchanged so re-deploying never rotates secrets; generation happens
/// only when the store reports the identity absent.
async fn fetch_or_generate<C>(
    client: &C,
    spec: &VariableSpec,
) -> Result<ResolvedValue, ResolutionError>
where
    C: ConfigServerClient + ?Sized,
{
    match client.get_value(&spec.identity).await {
        Ok(Some(value)) => {
            debug!(identity = %spec.identity, "using existing config server value");
            Ok(ResolvedValue {
                identity: spec.identity.clone(),
                value,
            })
        }
        Ok(None) => match &spec.var_type {
            Some(var_type) => {
                debug!(identity = %spec.identity, %var_type, "generating value");
                let value = client
                    .generate_value(&spec.identity, var_type, &spec.options)
                    .await
                    .map_err(|err| generate_error(&spec.identity, var_type, err))?;
                Ok(ResolvedValue {
                    identity: spec.identity.clone(),
                    value,
                })
            }
            None => Err(ResolutionError::MissingValue {
                identity: spec.identity.clone(),
            }),
        },
        Err(err) => Err(fetch_error(&spec.identity, err)),
    }
}

fn generate_error(
    identity: &VariableIdentity,
    var_type: &VariableType,
    err: ConfigServerError,
) -> ResolutionError {
    match err {
        ConfigServerError::Rejected { status } => ResolutionError::GenerationFailed {
            identity: identity.clone(),
            var_type: var_type.to_string(),
            status,
        },
        ConfigServerError::Transport { message } => ResolutionError::Transport {
            identity: identity.clone(),
            message,
        },
        ConfigServerError::InvalidResponse { message } => ResolutionError::StoreRejected {
            identity: identity.clone(),
            status: message,
        },
    }
}

fn fetch_error(identity: &VariableIdentity, err: ConfigServerError) -> ResolutionError {
    match err {
        ConfigServerError::Rejected { status } => ResolutionError::StoreRejected {
            identity: identity.clone(),
            status,
        },
        ConfigServerError::Transport { message } => ResolutionError::Transport {
            identity: identity.clone(),
            message,
        },
        ConfigServerError::InvalidResponse { message } => ResolutionError::StoreRejected {
            identity: identity.clone(),
            status: message,
        },
    }
}
