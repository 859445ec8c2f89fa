use anyhow::Context;
use chainbus::{Event, EventHandler, EventRegistry, HandlerSpec};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = include_str!("../config/events.json");

#[chainbus::event(kind = "login")]
#[derive(Debug, Clone, Default)]
struct LoginEvent {
    account: String,
    password: String,
    menu: Vec<String>,
}

impl LoginEvent {
    fn new(account: &str, password: &str) -> Self {
        Self {
            account: account.to_string(),
            password: password.to_string(),
            ..Default::default()
        }
    }
}

type Accounts = Arc<Mutex<HashMap<String, String>>>;

struct AccountAuthHandler {
    accounts: Accounts,
}

impl EventHandler<LoginEvent> for AccountAuthHandler {
    fn handler_name(&self) -> &str {
        "account_auth"
    }

    fn handle(&self, event: &mut LoginEvent) -> anyhow::Result<()> {
        let accounts = self
            .accounts
            .lock()
            .map_err(|_| anyhow::anyhow!("account store poisoned"))?;
        match accounts.get(&event.account) {
            Some(password) if *password == event.password => {}
            Some(_) => {
                event.state_mut().fail_with_code("password mismatch", 401);
            }
            None => {
                event.state_mut().fail_with_code("account not found", 404);
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct CodingParams {
    prefix: String,
}

struct AccountAuthCodingHandler {
    prefix: String,
}

impl EventHandler<LoginEvent> for AccountAuthCodingHandler {
    fn handler_name(&self) -> &str {
        "account_auth_coding"
    }

    fn handle(&self, event: &mut LoginEvent) -> anyhow::Result<()> {
        if !event.account.starts_with(&self.prefix) {
            event
                .state_mut()
                .fail_with_code(format!("account must start with {}", self.prefix), "E_CODING");
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct MenuParams {
    max_items: usize,
}

struct AccountMenuHandler {
    max_items: usize,
}

impl EventHandler<LoginEvent> for AccountMenuHandler {
    fn handler_name(&self) -> &str {
        "account_menu"
    }

    fn handle(&self, event: &mut LoginEvent) -> anyhow::Result<()> {
        event.menu = ["dashboard", "orders", "settings"]
            .iter()
            .take(self.max_items)
            .map(|s| s.to_string())
            .collect();
        Ok(())
    }
}

struct AccountStorageHandler;

impl EventHandler<LoginEvent> for AccountStorageHandler {
    fn handler_name(&self) -> &str {
        "account_storage"
    }

    fn handle(&self, event: &mut LoginEvent) -> anyhow::Result<()> {
        if event.account.ends_with("-readonly") {
            anyhow::bail!("storage is read-only for {}", event.account);
        }
        let description = format!("session stored for {}", event.account);
        event.state_mut().set_description(description);
        Ok(())
    }
}

fn register_handlers(registry: &EventRegistry, accounts: Accounts) {
    registry.register_factory::<LoginEvent, _, _>("account_auth", move |_spec: &HandlerSpec| {
        Ok(AccountAuthHandler {
            accounts: accounts.clone(),
        })
    });
    registry.register_factory::<LoginEvent, _, _>("account_auth_coding", |spec: &HandlerSpec| {
        let params: CodingParams = spec.params_as()?;
        Ok(AccountAuthCodingHandler {
            prefix: params.prefix,
        })
    });
    registry.register_factory::<LoginEvent, _, _>("account_menu", |spec: &HandlerSpec| {
        let params: MenuParams = spec.params_as()?;
        Ok(AccountMenuHandler {
            max_items: params.max_items,
        })
    });
    registry.register_factory::<LoginEvent, _, _>("account_storage", |_spec: &HandlerSpec| {
        Ok(AccountStorageHandler)
    });
}

fn report(label: &str, event: &LoginEvent) {
    let state = event.state();
    let mark = if event.is_success() { "✅" } else { "❌" };
    println!(
        "{mark} {label}: result={} code={} msg={} menu={:?}",
        state.result(),
        state.result_code(),
        state.result_message(),
        event.menu
    );
    if let Some(err) = state.error() {
        println!("   fault: {err}");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {path}"))?,
        None => DEFAULT_CONFIG.to_string(),
    };

    let accounts: Accounts = Arc::new(Mutex::new(HashMap::from([
        ("U1001".to_string(), "secret".to_string()),
        ("U1002-readonly".to_string(), "secret".to_string()),
        ("X9".to_string(), "secret".to_string()),
    ])));

    let registry = EventRegistry::global();
    register_handlers(registry, accounts);
    registry.import_json(&config)?;
    tracing::info!("login handlers registered");

    println!("=== 登录事件处理链示例 ===\n");

    report("正常登录", &registry.emit(LoginEvent::new("U1001", "secret")));
    report("密码错误", &registry.emit(LoginEvent::new("U1001", "wrong")));
    report("编号不合规", &registry.emit(LoginEvent::new("X9", "secret")));
    report("存储故障", &registry.emit(LoginEvent::new("U1002-readonly", "secret")));

    println!("\n--- 场景 auth：仅认证，不存储 ---");
    report(
        "场景认证",
        &registry.emit_scene(LoginEvent::new("U1002-readonly", "secret"), "auth"),
    );

    println!("\n--- 执行轨迹 ---");
    let traced = registry.emit(LoginEvent::new("U1001", "secret"));
    println!("{}", serde_json::to_string_pretty(&traced.dump())?);

    println!("\n--- 注册表导出 ---");
    println!("{}", serde_json::to_string_pretty(&registry.export())?);

    Ok(())
}
