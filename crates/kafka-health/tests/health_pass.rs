//! End-to-end health passes against an in-memory admin interface.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use kafka_health::{
    AdminClient, AdminError, BrokerConfig, BrokerId, ConsistencyVerdict, HealthCheckConfig,
    HealthCode, HealthReportAssembler, QuorumMode,
};

/// How a fake broker answers a config query.
#[derive(Clone)]
enum Reply {
    Config { config: BrokerConfig, delay: Duration },
    Fail,
    Hang,
}

#[derive(Default)]
struct FakeCluster {
    unreachable: bool,
    brokers: Vec<BrokerId>,
    replies: HashMap<BrokerId, Reply>,
}

impl FakeCluster {
    fn broker(mut self, id: i32, reply: Reply) -> Self {
        self.brokers.push(BrokerId(id));
        self.replies.insert(BrokerId(id), reply);
        self
    }
}

#[async_trait]
impl AdminClient for FakeCluster {
    async fn describe_cluster(&self) -> Result<Vec<BrokerId>, AdminError> {
        if self.unreachable {
            return Err(AdminError::Api {
                status: 503,
                message: "no brokers available".to_string(),
            });
        }
        Ok(self.brokers.clone())
    }

    async fn describe_broker_config(&self, broker: BrokerId) -> Result<BrokerConfig, AdminError> {
        match self.replies.get(&broker).cloned() {
            Some(Reply::Config { config, delay }) => {
                tokio::time::sleep(delay).await;
                Ok(config)
            }
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(AdminError::Timeout(3600))
            }
            Some(Reply::Fail) | None => Err(AdminError::NotFound(format!("broker {broker}"))),
        }
    }
}

fn kraft_config(id: i32, version: &str, extra: &[(&str, &str)]) -> BrokerConfig {
    let mut config: BrokerConfig = [
        ("broker.id", Some(id.to_string())),
        ("node.id", Some(id.to_string())),
        ("listeners", Some(format!("PLAINTEXT://kafka-{id}:9092"))),
        ("inter.broker.protocol.version", Some(version.to_string())),
        (
            "controller.quorum.voters",
            Some("1@kafka-1:9093,2@kafka-2:9093,3@kafka-3:9093".to_string()),
        ),
        ("min.insync.replicas", Some("2".to_string())),
    ]
    .into_iter()
    .collect();
    for (key, value) in extra {
        config.insert(*key, Some((*value).to_string()));
    }
    config
}

fn ok(config: BrokerConfig, delay_ms: u64) -> Reply {
    Reply::Config {
        config,
        delay: Duration::from_millis(delay_ms),
    }
}

fn config(total: usize) -> HealthCheckConfig {
    HealthCheckConfig::new(total)
        .with_kraft_enabled(true)
        .with_fetch_timeout(Duration::from_secs(10))
        .with_namespace("kafka-service")
}

#[tokio::test(start_paused = true)]
async fn test_hanging_broker_is_excluded_after_timeout() {
    let cluster = FakeCluster::default()
        .broker(1, ok(kraft_config(1, "3.6-IV2", &[]), 10))
        .broker(2, Reply::Hang)
        .broker(3, ok(kraft_config(3, "3.6-IV2", &[]), 10));

    let config = config(3);
    let report = HealthReportAssembler::new(&config).assemble(Some(&cluster)).await;

    assert_eq!(report.size, 2);
    assert_eq!(report.status, HealthCode::Degraded);
    assert_eq!(report.same_configs, ConsistencyVerdict::Consistent);
    assert_eq!(
        report.status_line(),
        "kafka_cluster size=2i,status=6,quorum_mode=101i,same_configs=\"Yes\",kafka_version=\"3.6.x\""
    );
}

#[tokio::test(start_paused = true)]
async fn test_broker_fetches_run_concurrently() {
    let cluster = (1..=5).fold(FakeCluster::default(), |cluster, id| {
        cluster.broker(id, ok(kraft_config(id, "3.6-IV2", &[]), 4_000))
    });

    let config = config(5).with_fetch_timeout(Duration::from_secs(5));
    let start = tokio::time::Instant::now();
    let report = HealthReportAssembler::new(&config).assemble(Some(&cluster)).await;
    let elapsed = start.elapsed();

    assert_eq!(report.size, 5);
    assert_eq!(report.status, HealthCode::Up);
    // five 4s fetches back to back would take 20s and trip the 5s timeout
    assert!(elapsed >= Duration::from_secs(4), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_divergence_does_not_depend_on_completion_order() {
    // broker 3 answers first, broker 1 last; the reference is still broker 1
    let cluster = FakeCluster::default()
        .broker(3, ok(kraft_config(3, "3.6-IV2", &[("auto.create.topics.enable", "true")]), 10))
        .broker(1, ok(kraft_config(1, "3.6-IV2", &[("auto.create.topics.enable", "false")]), 300))
        .broker(2, ok(kraft_config(2, "3.6-IV2", &[("auto.create.topics.enable", "false")]), 100));

    let config = config(3);
    let report = HealthReportAssembler::new(&config).assemble(Some(&cluster)).await;

    assert_eq!(report.status, HealthCode::Up);
    assert_eq!(
        report.same_configs.to_string(),
        "No: [auto.create.topics.enable]: false VS true"
    );
}

#[tokio::test(start_paused = true)]
async fn test_repeated_pass_is_identical() {
    let cluster = FakeCluster::default()
        .broker(1, ok(kraft_config(1, "3.6-IV2", &[]), 50))
        .broker(2, ok(kraft_config(2, "3.5-IV1", &[]), 5))
        .broker(3, Reply::Fail);

    let config = config(3).with_version_range("3.0.0", "3.5.x").unwrap();
    let assembler = HealthReportAssembler::new(&config);

    let first = assembler.assemble(Some(&cluster)).await.render();
    let second = assembler.assemble(Some(&cluster)).await.render();

    assert_eq!(first, second);
    assert!(first.ends_with(
        "application_version=3.5.x,min_version=3.0.0,max_version=3.5.x version_compatible=1i"
    ));
}

#[tokio::test]
async fn test_unreachable_admin_reports_down() {
    let cluster = FakeCluster {
        unreachable: true,
        ..FakeCluster::default()
    };

    let config = config(3);
    let report = HealthReportAssembler::new(&config).assemble(Some(&cluster)).await;

    assert_eq!(report.status, HealthCode::Down);
    assert_eq!(report.quorum_mode, QuorumMode::KRaft);
    assert_eq!(
        report.render(),
        "kafka_cluster size=0i,status=10,quorum_mode=101i,same_configs=\"Empty configs\",kafka_version=\"\""
    );
}

#[tokio::test]
async fn test_all_brokers_failing_is_down() {
    let cluster = FakeCluster::default()
        .broker(1, Reply::Fail)
        .broker(2, Reply::Fail);

    let config = config(2);
    let report = HealthReportAssembler::new(&config).assemble(Some(&cluster)).await;

    assert_eq!(report.status, HealthCode::Down);
    assert_eq!(report.same_configs, ConsistencyVerdict::NoData);
    assert_eq!(report.compatibility_line(), None);
}

#[tokio::test]
async fn test_incompatible_oldest_broker() {
    let cluster = FakeCluster::default()
        .broker(1, ok(kraft_config(1, "3.6-IV2", &[]), 0))
        .broker(2, ok(kraft_config(2, "2.8-IV1", &[]), 0));

    let config = config(2).with_version_range("3.0.0", "3.x.x").unwrap();
    let report = HealthReportAssembler::new(&config).assemble(Some(&cluster)).await;

    let compatibility = report.compatibility.expect("compatibility line");
    assert_eq!(compatibility.application_version, "2.8.x");
    assert!(!compatibility.compatible);
}
