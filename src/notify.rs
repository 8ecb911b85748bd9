//! Slack notifications
//!
//! Best-effort out-of-band reporting for pipeline runs via an incoming
//! webhook. Failures here are logged and swallowed by the caller; they never
//! change an API response.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde_json::json;
use std::fmt::Write as _;
use std::time::Duration;

use crate::config::SlackConfig;
use crate::domain::{MatchResult, Metric};

pub struct SlackNotifier {
    client: ClientWithMiddleware,
    webhook_url: String,
    channel: String,
    timezone: Tz,
}

impl SlackNotifier {
    pub fn new(webhook_url: String, channel: String, timezone: &str) -> Result<Self> {
        let timezone: Tz = timezone
            .parse()
            .map_err(|_| anyhow!("unrecognized timezone: {timezone}"))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(
            reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self {
            client,
            webhook_url,
            channel,
            timezone,
        })
    }

    /// `None` when no webhook URL is configured.
    pub fn from_config(cfg: &SlackConfig) -> Result<Option<Self>> {
        match &cfg.webhook_url {
            Some(url) => Ok(Some(Self::new(
                url.clone(),
                cfg.channel.clone(),
                &cfg.timezone,
            )?)),
            None => Ok(None),
        }
    }

    pub async fn report_success(
        &self,
        target_date: NaiveDate,
        hub: &str,
        metric: Metric,
        matches: &[MatchResult],
    ) -> Result<()> {
        let mut text = format!(
            "✅ *Like-day run*: `{target_date}` ({hub}, {metric})\n*Time:* {}\n```\nrank  date        distance  similarity\n",
            self.local_timestamp(),
        );
        for m in matches {
            let _ = writeln!(
                text,
                "{:>4}  {}  {:>8.4}  {:>10.3}",
                m.rank, m.date, m.distance, m.similarity
            );
        }
        text.push_str("```");

        self.post(&text).await
    }

    pub async fn report_failure(
        &self,
        target_date: NaiveDate,
        hub: &str,
        error: &anyhow::Error,
    ) -> Result<()> {
        let text = format!(
            "❌ *Like-day run failed*: `{target_date}` ({hub})\n*Error:* `{error:#}`\n*Time:* {}",
            self.local_timestamp(),
        );
        self.post(&text).await
    }

    fn local_timestamp(&self) -> String {
        Utc::now()
            .with_timezone(&self.timezone)
            .format("%a %b-%d %H:%M")
            .to_string()
    }

    async fn post(&self, text: &str) -> Result<()> {
        let payload = json!({ "channel": self.channel, "text": text });
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .context("slack webhook POST failed")?;
        resp.error_for_status()
            .context("slack webhook rejected the message")?;
        Ok(())
    }
}
