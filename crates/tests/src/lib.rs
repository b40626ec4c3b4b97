//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 跨 crate 的完整数据流：数据源 -> 重组 -> 解析 -> 分类 -> 双后端
//! - 脚本数据源与真实 TCP 回环两种传输
//! - 注入后端故障，验证相互隔离

#[cfg(test)]
mod contract_tests {
    use contracts::{Classification, LoggerConfig};

    #[test]
    fn test_contracts_compile() {
        let config = LoggerConfig::default();
        assert_eq!(config.feed.port, 30003);
        assert_eq!(Classification::ALL.len(), 5);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::Path;

    use contracts::{ConsoleConfig, CsvConfig, LoggerConfig, SqliteConfig};
    use dispatcher::{CsvBatchSink, Dispatcher, DispatcherBuilder, SqliteSink};
    use ingestion::ScriptedFeed;
    use sbs_logger_cli::{DrainTrigger, Pipeline, PipelineConfig};
    use tempfile::{tempdir, TempDir};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    /// One SBS position report line
    fn msg(icao: &str, altitude: &str, speed: &str) -> String {
        format!(
            "MSG,3,1,1,{icao},1,2024/05/01,12:00:00.000,2024/05/01,12:00:00.000,\
             CS{icao},{altitude},{speed},,53.35,-6.26,,,,,,0\n"
        )
    }

    /// Five reports covering every label, in table order
    fn five_reports() -> String {
        [
            msg("A00001", "30", "20"),
            msg("A00002", "200", "40"),
            msg("A00003", "1000", "100"),
            msg("A00004", "1000", "150"),
            msg("A00005", "", ""),
        ]
        .concat()
    }

    fn logger_config(dir: &TempDir, batch_size: usize) -> LoggerConfig {
        LoggerConfig {
            csv: CsvConfig {
                path: dir.path().join("adsb_data.csv"),
                batch_size,
            },
            sqlite: SqliteConfig {
                path: dir.path().join("adsb_data.sqlite"),
                enabled: true,
            },
            console: ConsoleConfig { echo: false },
            ..Default::default()
        }
    }

    fn csv_labels(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .skip(1)
            .map(|line| line.rsplit(',').next().unwrap().to_string())
            .collect()
    }

    async fn sqlite_rows(path: &Path) -> i64 {
        let sink = SqliteSink::open(
            "check",
            &SqliteConfig {
                path: path.to_path_buf(),
                enabled: true,
            },
        )
        .await
        .unwrap();
        sink.row_count().await.unwrap()
    }

    /// Split a byte string into fixed-size chunks that ignore line boundaries
    fn chunked(data: &str, size: usize) -> ScriptedFeed {
        ScriptedFeed::from_chunks(
            data.as_bytes()
                .chunks(size)
                .map(|c| c.to_vec())
                .collect::<Vec<_>>(),
        )
    }

    const EXPECTED_LABELS: [&str; 5] = ["Ground", "Drone", "Helicopter", "Airplane", "Unknown"];

    /// ScriptedFeed -> LineStream -> parse -> classify -> CSV + SQLite
    #[tokio::test]
    async fn test_e2e_scripted_feed() {
        let dir = tempdir().unwrap();
        let config = logger_config(&dir, 50);
        let dispatcher = DispatcherBuilder::new(config.clone()).build().await.unwrap();

        let feed = chunked(&five_reports(), 37);
        let stats = Pipeline::new(PipelineConfig::default())
            .run_with_source(feed, dispatcher, std::future::pending())
            .await;

        assert_eq!(stats.trigger, Some(DrainTrigger::RemoteClosed));
        assert_eq!(stats.records_parsed, 5);
        assert_eq!(stats.final_flush_rows, 5);
        assert_eq!(csv_labels(&config.csv.path), EXPECTED_LABELS);
        assert_eq!(sqlite_rows(&config.sqlite.path).await, 5);
    }

    /// Real TCP loopback, remote writes in uneven pieces then hangs up
    #[tokio::test]
    async fn test_e2e_tcp_loopback() {
        let dir = tempdir().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let payload = format!("{}MSG,8,1,1,ABCDEF\nSTA,1\n", five_reports());
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            for piece in payload.as_bytes().chunks(23) {
                socket.write_all(piece).await.unwrap();
                tokio::task::yield_now().await;
            }
            socket.shutdown().await.unwrap();
        });

        let mut logger = logger_config(&dir, 2);
        logger.feed.port = port;
        let config = PipelineConfig {
            logger: logger.clone(),
            ..Default::default()
        };

        let stats = Pipeline::new(config)
            .run(std::future::pending())
            .await
            .unwrap();
        server.await.unwrap();

        assert_eq!(stats.trigger, Some(DrainTrigger::RemoteClosed));
        assert_eq!(stats.records_parsed, 5);
        assert_eq!(stats.feed.total_skipped(), 2);
        // batch size 2: two threshold flushes, one row left for the final flush
        assert_eq!(stats.final_flush_rows, 1);
        assert_eq!(csv_labels(&logger.csv.path), EXPECTED_LABELS);
        assert_eq!(sqlite_rows(&logger.sqlite.path).await, 5);
    }

    /// A rejected insert costs one SQLite row and nothing in the CSV
    #[tokio::test]
    async fn test_e2e_sqlite_failure_isolated() {
        let dir = tempdir().unwrap();
        let config = logger_config(&dir, 50);

        let sqlite = SqliteSink::open("sqlite", &config.sqlite).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER reject_bad BEFORE INSERT ON adsb WHEN NEW.icao = 'BAD' \
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .execute(sqlite.pool().unwrap())
        .await
        .unwrap();
        let dispatcher =
            Dispatcher::with_sinks(CsvBatchSink::new("csv", &config.csv), Some(sqlite), None);

        let data = [
            msg("A00001", "30", "20"),
            msg("BAD", "200", "40"),
            msg("A00003", "1000", "100"),
            msg("A00004", "1000", "150"),
            msg("A00005", "", ""),
        ]
        .concat();

        let stats = Pipeline::new(PipelineConfig::default())
            .run_with_source(chunked(&data, 64), dispatcher, std::future::pending())
            .await;

        assert_eq!(stats.degraded_offers, 1);
        let (_, sqlite_metrics) = stats.sinks.iter().find(|(n, _)| n == "sqlite").unwrap();
        assert_eq!(sqlite_metrics.failure_count, 1);
        assert_eq!(csv_labels(&config.csv.path), EXPECTED_LABELS);
        assert_eq!(sqlite_rows(&config.sqlite.path).await, 4);
    }

    /// Two sessions append to the same files; the header appears once
    #[tokio::test]
    async fn test_e2e_sessions_append() {
        let dir = tempdir().unwrap();
        let config = logger_config(&dir, 3);

        for _ in 0..2 {
            let dispatcher = DispatcherBuilder::new(config.clone()).build().await.unwrap();
            Pipeline::new(PipelineConfig::default())
                .run_with_source(chunked(&five_reports(), 11), dispatcher, std::future::pending())
                .await;
        }

        let content = std::fs::read_to_string(&config.csv.path).unwrap();
        assert_eq!(content.lines().count(), 11);
        assert_eq!(content.matches("time,icao").count(), 1);
        assert_eq!(sqlite_rows(&config.sqlite.path).await, 10);
    }

    /// Capture file replay driven by a TOML config
    #[tokio::test]
    async fn test_e2e_replay_from_config_file() {
        let dir = tempdir().unwrap();
        let capture = dir.path().join("capture.sbs");
        std::fs::write(&capture, five_reports()).unwrap();

        let toml = format!(
            "[csv]\npath = {:?}\nbatch_size = 4\n\n[sqlite]\nenabled = false\n\n[console]\necho = false\n",
            dir.path().join("replay.csv").display().to_string()
        );
        let logger =
            config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
                .unwrap();

        let config = PipelineConfig {
            logger: logger.clone(),
            replay_path: Some(capture),
            ..Default::default()
        };
        let stats = Pipeline::new(config)
            .run(std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.records_parsed, 5);
        assert_eq!(stats.sinks.len(), 1);
        assert_eq!(csv_labels(&logger.csv.path), EXPECTED_LABELS);
        assert!(!dir.path().join("adsb_data.sqlite").exists());
    }
}
