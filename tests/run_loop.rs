//! Activation lifecycle tests with a fake launcher and a local control port

use kvshepherd::process::{LaunchSpec, ProcessLauncher, ShutdownClient};
use kvshepherd::topology::{ClusterNodeInfo, NodeDirectory, NodePage, StaticNodeDirectory};
use kvshepherd::{Error, Result, RunState, ServiceRunLoop, ServiceVariant, SupervisorConfig};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

#[derive(Clone, Default)]
struct FakeLauncher {
    launches: Arc<Mutex<Vec<LaunchSpec>>>,
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<()> {
        self.launches.lock().unwrap().push(spec.clone());
        Ok(())
    }
}

struct FailingLauncher;

impl ProcessLauncher for FailingLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<()> {
        Err(Error::LaunchFailed {
            program: spec.program.clone(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        })
    }
}

struct DownDirectory;

impl NodeDirectory for DownDirectory {
    async fn query_page(&self, _continuation_token: Option<&str>) -> Result<NodePage> {
        Err(Error::DirectoryUnavailable("directory offline".into()))
    }
}

/// Accepts control-port connections and forwards every payload received
async fn control_port() -> (ShutdownClient, mpsc::UnboundedReceiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut payload = Vec::new();
                let _ = socket.read_to_end(&mut payload).await;
                let _ = tx.send(payload);
            });
        }
    });
    (ShutdownClient::with_addr(addr, Duration::from_secs(2)), rx)
}

async fn expect_commands(rx: &mut mpsc::UnboundedReceiver<Vec<u8>>, count: usize) {
    for _ in 0..count {
        let payload = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("shutdown command not received")
            .unwrap();
        assert_eq!(payload, b"shutdown\n".to_vec());
    }
    // nothing beyond the expected attempts
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
}

fn config_for(variant: ServiceVariant, root: &Path) -> SupervisorConfig {
    let mut config = SupervisorConfig::default_for(variant);
    config.code_path = root.join("code");
    config.work_path = root.join("work");
    std::fs::create_dir_all(&config.code_path).unwrap();
    std::fs::write(config.template_path(), "port 1234\n").unwrap();
    config
}

#[tokio::test]
async fn test_immediate_cancellation_still_sends_teardown_shutdown() {
    let root = TempDir::new().unwrap();
    let config = config_for(ServiceVariant::Sentinel, root.path());
    let launcher = FakeLauncher::default();
    let (client, mut commands) = control_port().await;
    let directory = StaticNodeDirectory::new(vec![ClusterNodeInfo::new("a", "10.0.0.1")]);

    let run_loop =
        ServiceRunLoop::new(config, directory, launcher.clone()).with_shutdown_client(client);
    let state = run_loop.run(std::future::ready(())).await.unwrap();

    assert_eq!(state, RunState::Terminated);
    // one before start, exactly one during teardown
    expect_commands(&mut commands, 2).await;
    assert!(launcher.launches.lock().unwrap().is_empty());
    assert!(!root.path().join("work").exists());
}

#[tokio::test]
async fn test_store_activation_launches_with_plain_config() {
    let root = TempDir::new().unwrap();
    let config = config_for(ServiceVariant::Store, root.path());
    let launcher = FakeLauncher::default();
    let (client, mut commands) = control_port().await;

    let run_loop = ServiceRunLoop::new(config, StaticNodeDirectory::default(), launcher.clone())
        .with_shutdown_client(client);
    let mut states = run_loop.subscribe();
    let cancel = async move {
        let _ = states.wait_for(|s| *s == RunState::Running).await;
    };

    let state = tokio::time::timeout(Duration::from_secs(5), run_loop.run(cancel))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state, RunState::Terminated);
    expect_commands(&mut commands, 2).await;

    let launches = launcher.launches.lock().unwrap();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].program, root.path().join("code/redis-server"));
    assert_eq!(launches[0].working_dir, root.path().join("work/store"));
    assert_eq!(launches[0].argument_string(), "redis.conf");
    assert_eq!(
        std::fs::read_to_string(root.path().join("work/store/redis.conf")).unwrap(),
        "port 1234\n"
    );
}

#[tokio::test]
async fn test_sentinel_activation_uses_paged_topology() {
    let root = TempDir::new().unwrap();
    let config = config_for(ServiceVariant::Sentinel, root.path());
    let launcher = FakeLauncher::default();
    let (client, mut commands) = control_port().await;
    let directory = StaticNodeDirectory::new(vec![
        ClusterNodeInfo::new("a", "10.0.0.1"),
        ClusterNodeInfo::new("b", "10.0.0.2"),
        ClusterNodeInfo::new("c", "10.0.0.3"),
    ])
    .with_page_size(2);

    let run_loop =
        ServiceRunLoop::new(config, directory, launcher.clone()).with_shutdown_client(client);
    let mut states = run_loop.subscribe();
    let cancel = async move {
        let _ = states.wait_for(|s| *s == RunState::Running).await;
    };
    run_loop.run(cancel).await.unwrap();
    expect_commands(&mut commands, 2).await;

    let written =
        std::fs::read_to_string(root.path().join("work/sentinel/sentinel.conf")).unwrap();
    assert!(written.contains("sentinel monitor mymaster 10.0.0.1 6379 2\n"));
    assert!(written.contains("sentinel known-replica mymaster 10.0.0.2 6379\n"));
    assert!(written.contains("sentinel known-replica mymaster 10.0.0.3 6379\n"));

    let launches = launcher.launches.lock().unwrap();
    assert_eq!(launches[0].argument_string(), "sentinel.conf --sentinel");
}

#[tokio::test]
async fn test_directory_failure_aborts_before_files_and_still_shuts_down() {
    let root = TempDir::new().unwrap();
    let config = config_for(ServiceVariant::Sentinel, root.path());
    let launcher = FakeLauncher::default();
    let (client, mut commands) = control_port().await;

    let run_loop =
        ServiceRunLoop::new(config, DownDirectory, launcher.clone()).with_shutdown_client(client);
    let result = run_loop.run(std::future::pending::<()>()).await;

    assert!(matches!(result, Err(Error::DirectoryUnavailable(_))));
    assert_eq!(run_loop.state(), RunState::Terminated);
    expect_commands(&mut commands, 2).await;
    assert!(!root.path().join("work").exists());
    assert!(launcher.launches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_launch_failure_is_fatal_and_shuts_down() {
    let root = TempDir::new().unwrap();
    let config = config_for(ServiceVariant::Store, root.path());
    let (client, mut commands) = control_port().await;

    let run_loop = ServiceRunLoop::new(config, StaticNodeDirectory::default(), FailingLauncher)
        .with_shutdown_client(client);
    let result = run_loop.run(std::future::pending::<()>()).await;

    assert!(matches!(result, Err(Error::LaunchFailed { .. })));
    expect_commands(&mut commands, 2).await;
}

#[tokio::test]
async fn test_no_listener_does_not_fail_activation() {
    let root = TempDir::new().unwrap();
    let mut config = config_for(ServiceVariant::Store, root.path());
    config.control_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let launcher = FakeLauncher::default();

    let run_loop = ServiceRunLoop::new(config, StaticNodeDirectory::default(), launcher.clone());
    let mut states = run_loop.subscribe();
    let cancel = async move {
        let _ = states.wait_for(|s| *s == RunState::Running).await;
    };

    let state = run_loop.run(cancel).await.unwrap();
    assert_eq!(state, RunState::Terminated);
    assert_eq!(launcher.launches.lock().unwrap().len(), 1);
}
