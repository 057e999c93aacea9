//! Server assembly and lifecycle

use axum::Router;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

use turnstile_core::{
    Application, ApplicationRepository, ExecutorRegistry, FlowSessionRepository, GraphId,
    GraphRepository, Orchestrator, TracingEventHandler,
};
use turnstile_dsl::{load_graphs_from_dir, Format};
use turnstile_state_inmemory::{seed_user, ExpirySweeper, InMemoryStateStoreProvider, InMemoryUserStore};
use turnstile_stdlib::{
    register_defaults, HttpIdentityProviderClient, LoggingNotificationSender, StdlibServices,
    UserStore,
};

use crate::api::{build_router, AppState};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// A fully wired server: repositories, executors and the orchestrator
pub struct TurnstileServer {
    config: ServerConfig,
    state: AppState,
    sessions: Arc<dyn FlowSessionRepository>,
}

impl TurnstileServer {
    /// Load definitions and wire every collaborator
    pub async fn build(config: ServerConfig) -> ServerResult<Self> {
        let provider = InMemoryStateStoreProvider::new();
        let (sessions, graphs, applications) = provider.create_repositories();

        if let Some(dir) = &config.graphs_dir {
            let loaded = load_graphs_from_dir(dir)?;
            info!(count = loaded.len(), dir = %dir.display(), "Loaded graph definitions");
            for graph in loaded {
                graphs.register(graph).await?;
            }
        }

        if let Some(file) = &config.applications_file {
            let known = graphs.list_ids().await?;
            for application in load_applications(file)? {
                check_bindings(&application, &known);
                applications.save(application).await?;
            }
        }

        let users = Arc::new(InMemoryUserStore::new());
        for seed in &config.seed_users {
            users
                .create(seed_user(&seed.username, &seed.password, seed.attributes()))
                .await
                .map_err(|e| ServerError::ConfigError(format!("seed user {}: {}", seed.username, e)))?;
        }

        let identity_providers = HttpIdentityProviderClient::new(config.idp_endpoints())
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let services = StdlibServices {
            users,
            notifications: Arc::new(LoggingNotificationSender),
            identity_providers: Arc::new(identity_providers),
            otp: config.otp_settings(),
        };

        let mut registry = ExecutorRegistry::new();
        register_defaults(&mut registry, &services)?;
        let executors = registry.names();
        info!(executors = ?executors, "Registered executors");

        let orchestrator = Orchestrator::new(
            sessions.clone(),
            graphs,
            applications,
            Arc::new(registry),
            Arc::new(TracingEventHandler),
            config.orchestrator_config(),
        );

        Ok(Self {
            config,
            state: AppState::new(Arc::new(orchestrator), executors),
            sessions,
        })
    }

    /// Router over this server's state
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// The flow engine
    pub fn orchestrator(&self) -> Arc<Orchestrator> {
        self.state.orchestrator.clone()
    }

    /// Serve until ctrl-c
    pub async fn run(self) -> ServerResult<()> {
        info!("Starting Turnstile Server");

        let listener = TcpListener::bind(self.config.listen_address()).await?;
        info!("Listening on {}", listener.local_addr()?);

        let sweeper = ExpirySweeper::start(
            self.sessions.clone(),
            Duration::from_secs(self.config.sweep_interval_secs),
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        sweeper.stop();
        info!("Server stopped");
        Ok(())
    }
}

/// Read a JSON or YAML list of applications
pub fn load_applications(path: &Path) -> ServerResult<Vec<Application>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ServerError::ApplicationRegistryError(format!("{}: {}", path.display(), e))
    })?;

    let applications: Vec<Application> = match Format::from_path(path)? {
        Format::Json => serde_json::from_str(&text)?,
        Format::Yaml => serde_yaml::from_str(&text)?,
    };

    info!(count = applications.len(), path = %path.display(), "Loaded applications");
    Ok(applications)
}

fn check_bindings(application: &Application, known: &[GraphId]) {
    let bound = std::iter::once(&application.auth_flow_graph_id)
        .chain(application.registration_flow_graph_id.as_ref());
    for graph_id in bound {
        if !known.contains(graph_id) {
            warn!(
                application_id = %application.id,
                graph_id = %graph_id,
                "Application is bound to a graph that is not loaded"
            );
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
