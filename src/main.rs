//! course-qa - 课程资料问答
//!
//! 入口：初始化日志、加载配置与课程目录、构建协调器，然后在 stdin 上逐行问答。
//! 命令：/clear 清空当前会话，/courses 显示课程统计，/quit 退出。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use course_qa::config::load_config;
use course_qa::retrieval::InMemoryCatalog;
use course_qa::{observability, CoordinatorBuilder};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;

    let catalog = InMemoryCatalog::load(&cfg.retrieval.catalog_path, cfg.tools.max_results)
        .map_err(anyhow::Error::msg)
        .context("Failed to load course catalog")?;

    let coordinator = CoordinatorBuilder::new(cfg, Arc::new(catalog))
        .build()
        .context("Failed to build query coordinator")?;

    let mut session_id = coordinator.create_session().await;
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(b"> ").await?;
    stdout.flush().await?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            "/quit" | "/exit" => break,
            "/clear" => {
                coordinator.clear_session(&session_id).await;
                session_id = coordinator.create_session().await;
                stdout.write_all(b"(session cleared)\n").await?;
            }
            "/courses" => {
                let analytics = coordinator.course_analytics().await;
                let mut out = format!("{} courses\n", analytics.total_courses);
                for title in &analytics.course_titles {
                    out.push_str(&format!("  - {title}\n"));
                }
                stdout.write_all(out.as_bytes()).await?;
            }
            question => match coordinator.query(question, Some(session_id.as_str())).await {
                Ok(outcome) => {
                    let mut out = format!("{}\n", outcome.answer);
                    if !outcome.citations.is_empty() {
                        out.push_str("\nSources:\n");
                        for (i, c) in outcome.citations.iter().enumerate() {
                            match &c.url {
                                Some(url) => out.push_str(&format!("  [{}] {} <{}>\n", i + 1, c.label, url)),
                                None => out.push_str(&format!("  [{}] {}\n", i + 1, c.label)),
                            }
                        }
                    }
                    stdout.write_all(out.as_bytes()).await?;
                }
                Err(e) => {
                    tracing::error!(error = %e, "query failed");
                    stdout.write_all(format!("error: {e}\n").as_bytes()).await?;
                }
            },
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    let (input, output, total) = coordinator.token_usage();
    tracing::info!(input, output, total, "token usage");
    Ok(())
}
