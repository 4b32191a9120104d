use anyhow::Context;
use order_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境变量 (.env 可选)
    dotenv::dotenv().ok();

    // 2. 加载配置
    let config = Config::from_env();

    // 3. 日志 (文件日志需要目录先存在)
    if !config.is_in_memory() {
        config
            .ensure_work_dir_structure()
            .context("failed to create work directory")?;
    }
    let log_dir = config.log_dir();
    init_logger_with_file(Some(&config.log_level), log_dir.to_str());

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Order server starting..."
    );

    // 4. 初始化服务器状态
    let state = ServerState::initialize(&config)
        .await
        .context("failed to initialize server state")?;

    // 5. 启动 HTTP 服务器
    Server::with_state(config, state)
        .run()
        .await
        .context("server terminated with an error")?;

    Ok(())
}
