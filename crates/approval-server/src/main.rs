//! Approval workflow server
//!
//! Runs the coordinator, the dispatch node, the notification fan-out, or all
//! three in one process.

mod grpc_service;
mod http_api;
mod notification_ws;

use approval_core::{
    config::StoreBackend, directory_from_config, store_from_config, ApprovalConfig, ChannelRegistry,
    Coordinator, DispatchNode, DispatchQueue, DispatchSink, GrpcCoordinatorClient, GrpcDispatchClient,
    HttpNotifier, Notifier, ResultRelay,
};
use axum::Router;
use clap::{value_parser, Arg, ArgMatches, Command};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Coordinator,
    Dispatch,
    Notification,
    All,
}

impl Role {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "coordinator" => Some(Self::Coordinator),
            "dispatch" => Some(Self::Dispatch),
            "notification" => Some(Self::Notification),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();

    let config_path = matches.get_one::<PathBuf>("config");
    let mut config = ApprovalConfig::load(config_path.map(PathBuf::as_path))?;
    apply_overrides(&mut config, &matches);
    config.validate()?;
    match config_path {
        Some(path) => log::info!("Loaded configuration from {}", path.display()),
        None => log::info!("No configuration file given, using defaults and environment"),
    }

    let role = matches
        .get_one::<String>("role")
        .and_then(|value| Role::parse(value))
        .unwrap_or(Role::All);
    log::info!("Starting approval server as {:?}", role);

    let mut servers: JoinSet<Result<(), BoxError>> = JoinSet::new();

    match role {
        Role::Coordinator => {
            let dispatch: Arc<dyn DispatchSink> =
                Arc::new(GrpcDispatchClient::new(config.peers.dispatch_grpc_url.clone()));
            let notifier: Arc<dyn Notifier> = Arc::new(HttpNotifier::new(&config.peers.notification_url));
            let coordinator = build_coordinator(&config, dispatch, notifier)?;
            spawn_coordinator(&mut servers, &config, coordinator);
        }
        Role::Dispatch => {
            let relay: Arc<dyn ResultRelay> =
                Arc::new(GrpcCoordinatorClient::new(config.peers.coordinator_grpc_url.clone()));
            let node = Arc::new(DispatchNode::new(Arc::new(DispatchQueue::new()), relay));
            spawn_dispatch(&mut servers, &config, node);
        }
        Role::Notification => {
            spawn_notification(&mut servers, &config, Arc::new(ChannelRegistry::new()));
        }
        Role::All => {
            // Nodes talk in-process; the network surfaces stay up for external peers
            let queue = Arc::new(DispatchQueue::new());
            let registry = Arc::new(ChannelRegistry::new());
            let coordinator = build_coordinator(&config, queue.clone(), registry.clone())?;
            let node = Arc::new(DispatchNode::new(queue, coordinator.clone()));

            spawn_coordinator(&mut servers, &config, coordinator);
            spawn_dispatch(&mut servers, &config, node);
            spawn_notification(&mut servers, &config, registry);
        }
    }

    // Wait for any server to exit (or fail)
    tokio::select! {
        Some(result) = servers.join_next() => {
            match result {
                Ok(Ok(())) => log::info!("Server exited normally"),
                Ok(Err(e)) => {
                    log::error!("Server failed: {}", e);
                    std::process::exit(1);
                }
                Err(e) => {
                    log::error!("Server task panicked: {}", e);
                    std::process::exit(1);
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Shutdown requested");
        }
    }

    Ok(())
}

fn cli() -> Command {
    Command::new("approval-server")
        .version("1.0.0")
        .about("Sequential multi-party approval workflow")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path (JSON)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("role")
                .long("role")
                .value_name("ROLE")
                .help("Which node to run")
                .value_parser(["coordinator", "dispatch", "notification", "all"])
                .default_value("all"),
        )
        .arg(addr_arg("coordinator-http", "Coordinator HTTP listen address"))
        .arg(addr_arg("coordinator-grpc", "Coordinator gRPC listen address"))
        .arg(addr_arg("dispatch-http", "Dispatch node HTTP listen address"))
        .arg(addr_arg("dispatch-grpc", "Dispatch node gRPC listen address"))
        .arg(addr_arg("notification-http", "Notification trigger listen address"))
        .arg(addr_arg("notification-ws", "Notification push channel listen address"))
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Store approval documents as JSON files in this directory")
                .value_parser(value_parser!(PathBuf)),
        )
}

fn addr_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("ADDR")
        .help(help)
        .value_parser(value_parser!(SocketAddr))
}

fn apply_overrides(config: &mut ApprovalConfig, matches: &ArgMatches) {
    let addr = |name: &str| matches.get_one::<SocketAddr>(name).copied();

    if let Some(a) = addr("coordinator-http") {
        config.coordinator.http_addr = a;
    }
    if let Some(a) = addr("coordinator-grpc") {
        config.coordinator.grpc_addr = a;
    }
    if let Some(a) = addr("dispatch-http") {
        config.dispatch.http_addr = a;
    }
    if let Some(a) = addr("dispatch-grpc") {
        config.dispatch.grpc_addr = a;
    }
    if let Some(a) = addr("notification-http") {
        config.notification.http_addr = a;
    }
    if let Some(a) = addr("notification-ws") {
        config.notification.ws_addr = a;
    }
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config.store.backend = StoreBackend::File;
        config.store.path = dir.clone();
    }
}

fn build_coordinator(
    config: &ApprovalConfig,
    dispatch: Arc<dyn DispatchSink>,
    notifier: Arc<dyn Notifier>,
) -> Result<Arc<Coordinator>, BoxError> {
    let store = store_from_config(&config.store)?;
    let directory = directory_from_config(&config.directory);
    log::info!("Workflow store backend: {:?}", config.store.backend);

    Ok(Arc::new(Coordinator::new(store, directory, dispatch, notifier)))
}

fn spawn_coordinator(servers: &mut JoinSet<Result<(), BoxError>>, config: &ApprovalConfig, coordinator: Arc<Coordinator>) {
    let http_addr = config.coordinator.http_addr;
    let grpc_addr = config.coordinator.grpc_addr;

    servers.spawn(serve_http("coordinator", http_addr, http_api::coordinator_router(coordinator.clone())));
    servers.spawn(grpc_service::start_coordinator_grpc_server(coordinator, grpc_addr));
}

fn spawn_dispatch(servers: &mut JoinSet<Result<(), BoxError>>, config: &ApprovalConfig, node: Arc<DispatchNode>) {
    let http_addr = config.dispatch.http_addr;
    let grpc_addr = config.dispatch.grpc_addr;

    servers.spawn(serve_http("dispatch", http_addr, http_api::dispatch_router(node.clone())));
    servers.spawn(grpc_service::start_dispatch_grpc_server(node, grpc_addr));
}

fn spawn_notification(
    servers: &mut JoinSet<Result<(), BoxError>>,
    config: &ApprovalConfig,
    registry: Arc<ChannelRegistry>,
) {
    servers.spawn(serve_http(
        "notification",
        config.notification.http_addr,
        notification_ws::notify_router(registry.clone()),
    ));
    servers.spawn(serve_http(
        "push channel",
        config.notification.ws_addr,
        notification_ws::push_router(registry),
    ));
}

async fn serve_http(name: &'static str, addr: SocketAddr, app: Router) -> Result<(), BoxError> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        log::error!("Failed to bind {} HTTP server on {}: {}", name, addr, e);
        e
    })?;

    log::info!("Starting {} HTTP server on {}", name, addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_addresses_and_store() {
        let matches = cli()
            .try_get_matches_from([
                "approval-server",
                "--role",
                "dispatch",
                "--dispatch-grpc",
                "127.0.0.1:6053",
                "--data-dir",
                "/tmp/approvals",
            ])
            .unwrap();

        let mut config = ApprovalConfig::default();
        apply_overrides(&mut config, &matches);

        assert_eq!(config.dispatch.grpc_addr.to_string(), "127.0.0.1:6053");
        assert_eq!(config.dispatch.http_addr.port(), 5003);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(
            matches.get_one::<String>("role").and_then(|v| Role::parse(v)),
            Some(Role::Dispatch)
        );
    }

    #[test]
    fn test_cli_rejects_unknown_role() {
        assert!(cli()
            .try_get_matches_from(["approval-server", "--role", "auditor"])
            .is_err());
    }
}
