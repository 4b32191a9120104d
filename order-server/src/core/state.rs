use std::sync::Arc;

use crate::core::Config;
use crate::db::DbService;
use crate::message::{EventPublisher, MessageBus};
use crate::notifications::{InboxService, NotificationDispatcher};
use crate::orders::OrdersManager;
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是浅拷贝 (内部为 Arc 或连接池句柄)。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | bus | MessageBus | 实时推送总线 |
/// | orders | OrdersManager | 订单引擎 |
/// | inbox | InboxService | 通知收件箱 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub bus: MessageBus,
    pub orders: OrdersManager,
    pub inbox: InboxService,
}

impl ServerState {
    /// 用已有的数据库和总线组装状态
    pub fn new(config: Config, db: DbService, bus: MessageBus) -> Self {
        let publisher: Arc<dyn EventPublisher> = Arc::new(bus.clone());
        let orders = OrdersManager::new(db.clone(), NotificationDispatcher::new(publisher))
            .with_rates(config.pricing_rates());
        let inbox = InboxService::new(db.clone());
        Self {
            config,
            db,
            bus,
            orders,
            inbox,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (运行迁移)
    /// 3. 消息总线与订单引擎
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = if config.is_in_memory() {
            DbService::in_memory().await?
        } else {
            config
                .ensure_work_dir_structure()
                .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;
            DbService::new(&config.database_url, config.db_max_connections).await?
        };

        let bus = MessageBus::with_capacity(config.bus_capacity);
        tracing::info!(
            capacity = config.bus_capacity,
            fee_percent = %config.platform_fee_percent,
            tax_percent = %config.tax_percent,
            "Order engine ready"
        );
        Ok(Self::new(config.clone(), db, bus))
    }

    /// 停止实时推送 (SSE 订阅流随之结束)
    pub fn shutdown(&self) {
        self.bus.shutdown();
    }
}
