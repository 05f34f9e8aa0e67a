//! Unit tests for the scheduler cycle

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::{AssetConfig, Config, ReportFormat, ScheduleMode};
    use crate::error::BotError;
    use crate::notify::{MockChatSink, OutboundMessage};
    use crate::report::UNAVAILABLE;
    use crate::testing::{daily_series, strong_bullish_series, FakeMarketData, FakeResponse, RecordingSink};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    const SIX: [&str; 6] = ["BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT", "BNBUSDT", "DOGEUSDT"];

    fn make_config(format: ReportFormat, symbols: &[&str]) -> Config {
        let mut config = Config::default();
        config.report.format = format;
        config.report.assets = symbols.iter().map(|s| AssetConfig::new(*s)).collect();
        config.report.charts = false;
        config
    }

    fn all_bullish(symbols: &[&str]) -> FakeMarketData {
        symbols.iter().fold(FakeMarketData::new(), |fake, s| {
            fake.with(s, FakeResponse::Series(strong_bullish_series(s)))
        })
    }

    #[tokio::test]
    async fn test_embed_cycle_sends_one_message_for_all_assets() {
        let config = make_config(ReportFormat::Embed, &SIX);
        let source = Arc::new(all_bullish(&SIX));
        let sink = Arc::new(RecordingSink::default());
        let scheduler = BiasScheduler::new(&config, source.clone(), sink.clone()).unwrap();

        let summary = scheduler.run_cycle(CycleTrigger::Scheduled).await;

        assert_eq!(source.calls(), 6);
        assert_eq!(summary.assets, 6);
        assert_eq!(summary.messages, 1);
        assert_eq!(summary.delivered, 1);
        assert!(summary.is_clean());

        let sent = sink.sent().await;
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            OutboundMessage::Embed(embed) => {
                assert_eq!(embed.fields.len(), 6);
                // Field order follows configuration order
                for (field, symbol) in embed.fields.iter().zip(SIX) {
                    assert!(field.name.ends_with(symbol));
                    assert!(field.value.contains("STRONG BULLISH"));
                }
            }
            other => panic!("expected embed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_text_cycle_sends_message_and_chart_per_asset() {
        let dir = tempdir().unwrap();
        let mut config = make_config(ReportFormat::Text, &["BTCUSDT", "ETHUSDT"]);
        config.report.charts = true;
        config.report.chart_width = 200;
        config.report.chart_height = 150;
        config.report.chart_path = dir.path().join("{asset}_daily.png").to_string_lossy().into_owned();

        let source = Arc::new(all_bullish(&["BTCUSDT", "ETHUSDT"]));
        let sink = Arc::new(RecordingSink::default());
        let scheduler = BiasScheduler::new(&config, source, sink.clone()).unwrap();

        let summary = scheduler.run_cycle(CycleTrigger::Startup).await;
        assert_eq!(summary.messages, 4);
        assert_eq!(summary.delivered, 4);

        let sent = sink.sent().await;
        assert!(matches!(&sent[0], OutboundMessage::Text(t) if t.starts_with("📊 **Daily BTCUSDT Bias**")));
        assert!(matches!(&sent[2], OutboundMessage::Text(t) if t.starts_with("📊 **Daily ETHUSDT Bias**")));

        let btc_chart = dir.path().join("btc_daily.png");
        let eth_chart = dir.path().join("eth_daily.png");
        assert_eq!(
            sent[1],
            OutboundMessage::File {
                path: btc_chart.clone(),
                caption: None
            }
        );
        assert_eq!(
            sent[3],
            OutboundMessage::File {
                path: eth_chart.clone(),
                caption: None
            }
        );
        assert!(btc_chart.exists());
        assert!(eth_chart.exists());
    }

    #[tokio::test]
    async fn test_failed_assets_become_placeholders() {
        let config = make_config(ReportFormat::Embed, &["BTCUSDT", "ETHUSDT", "SOLUSDT"]);
        let source = FakeMarketData::new()
            .with("BTCUSDT", FakeResponse::Series(strong_bullish_series("BTCUSDT")))
            .with("ETHUSDT", FakeResponse::Fail("row 3: invalid open price".into()));
        // SOLUSDT has no entry and answers with an API error
        let sink = Arc::new(RecordingSink::default());
        let scheduler = BiasScheduler::new(&config, Arc::new(source), sink.clone()).unwrap();

        let summary = scheduler.run_cycle(CycleTrigger::Scheduled).await;
        assert_eq!(summary.failed_assets, 2);
        assert_eq!(summary.delivered, 1);
        assert!(!summary.is_clean());

        let sent = sink.sent().await;
        let embed = match &sent[0] {
            OutboundMessage::Embed(embed) => embed,
            other => panic!("expected embed, got {:?}", other),
        };
        assert_eq!(embed.fields.len(), 3);
        assert!(embed.fields[0].value.contains("STRONG BULLISH"));
        assert_eq!(embed.fields[1].value, UNAVAILABLE);
        assert_eq!(embed.fields[2].value, UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_short_series_is_reported_unavailable() {
        let config = make_config(ReportFormat::Text, &["NEWUSDT"]);
        let short = daily_series("NEWUSDT", &[(1.0, 2.0, 0.5, 1.5), (1.5, 2.5, 1.0, 2.0)]);
        let source = FakeMarketData::new().with("NEWUSDT", FakeResponse::Series(short));
        let sink = Arc::new(RecordingSink::default());
        let scheduler = BiasScheduler::new(&config, Arc::new(source), sink.clone()).unwrap();

        let summary = scheduler.run_cycle(CycleTrigger::Scheduled).await;
        assert_eq!(summary.failed_assets, 1);
        assert_eq!(summary.messages, 1);

        let sent = sink.sent().await;
        assert!(matches!(&sent[0], OutboundMessage::Text(t) if t.contains(UNAVAILABLE)));
    }

    #[tokio::test]
    async fn test_hanging_fetch_times_out() {
        let config = make_config(ReportFormat::Embed, &["BTCUSDT", "ETHUSDT"]);
        let source = FakeMarketData::new()
            .with("BTCUSDT", FakeResponse::Hang)
            .with("ETHUSDT", FakeResponse::Series(strong_bullish_series("ETHUSDT")));
        let sink = Arc::new(RecordingSink::default());
        let scheduler = BiasScheduler::new(&config, Arc::new(source), sink.clone())
            .unwrap()
            .with_fetch_timeout(Duration::from_millis(50));

        let summary = tokio::time::timeout(
            Duration::from_secs(5),
            scheduler.run_cycle(CycleTrigger::Scheduled),
        )
        .await
        .expect("cycle should finish once the fetch times out");

        assert_eq!(summary.failed_assets, 1);
        assert_eq!(summary.delivered, 1);
        assert_eq!(sink.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_stop_cycle() {
        let config = make_config(ReportFormat::Text, &["BTCUSDT", "ETHUSDT"]);
        let source = all_bullish(&["BTCUSDT", "ETHUSDT"]);

        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let mut sink = MockChatSink::new();
        sink.expect_send_text().times(2).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(BotError::Delivery("channel 1 returned 403 Forbidden".into()))
            } else {
                Ok(())
            }
        });
        sink.expect_send_file().never();
        sink.expect_send_embed().never();

        let scheduler = BiasScheduler::new(&config, Arc::new(source), Arc::new(sink)).unwrap();
        let summary = scheduler.run_cycle(CycleTrigger::Scheduled).await;

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(summary.messages, 2);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.failed_deliveries, 1);
        assert_eq!(summary.failed_assets, 0);
    }

    #[tokio::test]
    async fn test_cycles_are_independent() {
        let config = make_config(ReportFormat::Embed, &["BTCUSDT"]);
        let source = Arc::new(all_bullish(&["BTCUSDT"]));
        let sink = Arc::new(RecordingSink::default());
        let scheduler = BiasScheduler::new(&config, source.clone(), sink.clone()).unwrap();

        let first = scheduler.run_cycle(CycleTrigger::Startup).await;
        let second = scheduler.run_cycle(CycleTrigger::Scheduled).await;

        assert_eq!(source.calls(), 2);
        assert_eq!(first.delivered, second.delivered);
        let sent = sink.sent().await;
        assert_eq!(sent.len(), 2);
        match (&sent[0], &sent[1]) {
            (OutboundMessage::Embed(a), OutboundMessage::Embed(b)) => {
                assert_eq!(a.title, "📊 Market Bias (startup)");
                assert_eq!(b.title, "📊 Daily Market Bias");
                assert_eq!(a.fields, b.fields);
            }
            other => panic!("expected two embeds, got {:?}", other),
        }
    }

    async fn titles(sink: &RecordingSink) -> Vec<String> {
        sink.sent()
            .await
            .into_iter()
            .map(|message| match message {
                OutboundMessage::Embed(embed) => embed.title,
                other => panic!("expected embed, got {:?}", other),
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_starts_with_startup_cycle_then_repeats() {
        let config = make_config(ReportFormat::Embed, &["BTCUSDT"]);
        let sink = Arc::new(RecordingSink::default());
        let scheduler =
            BiasScheduler::new(&config, Arc::new(all_bullish(&["BTCUSDT"])), sink.clone()).unwrap();

        // run() never returns; stop it a minute after the second 24h firing
        let stopped = tokio::time::timeout(Duration::from_secs(48 * 3600 + 60), scheduler.run()).await;
        assert!(stopped.is_err());

        assert_eq!(
            titles(&sink).await,
            vec![
                "📊 Market Bias (startup)",
                "📊 Daily Market Bias",
                "📊 Daily Market Bias",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_without_startup_cycle_waits_for_trigger() {
        let mut config = make_config(ReportFormat::Embed, &["BTCUSDT"]);
        config.schedule.run_on_startup = false;
        let sink = Arc::new(RecordingSink::default());
        let scheduler =
            BiasScheduler::new(&config, Arc::new(all_bullish(&["BTCUSDT"])), sink.clone()).unwrap();

        let _ = tokio::time::timeout(Duration::from_secs(60), scheduler.run()).await;
        assert!(sink.sent().await.is_empty());

        let _ = tokio::time::timeout(Duration::from_secs(24 * 3600 + 60), scheduler.run()).await;
        assert_eq!(titles(&sink).await, vec!["📊 Daily Market Bias"]);
    }

    #[test]
    fn test_scheduler_uses_configured_trigger() {
        let mut config = make_config(ReportFormat::Embed, &SIX);
        config.schedule.mode = ScheduleMode::Daily;
        let scheduler = BiasScheduler::new(
            &config,
            Arc::new(FakeMarketData::new()),
            Arc::new(RecordingSink::default()),
        )
        .unwrap();

        assert_eq!(scheduler.trigger().to_string(), "daily at 00:00 UTC");
        assert_eq!(scheduler.assets().len(), 6);
    }
}
