use chainbus::{
    BusConfig, BusError, Event, EventFault, EventHandler, EventRegistry, FnHandler,
    HandlerDescriptor, HandlerSpec, ResultCode, ResultState, SceneRule,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[chainbus::event(kind = "login")]
#[derive(Debug, Clone, Default)]
struct LoginEvent {
    account: String,
}

#[chainbus::event(kind = "audit")]
#[derive(Debug, Clone, Default)]
struct AuditEvent {}

type Journal = Arc<Mutex<Vec<String>>>;

/// 记录执行顺序的处理器，可配置为失败/中断/返回错误
#[derive(Clone)]
enum Behavior {
    Pass,
    Fail(&'static str),
    Abort,
    Error(&'static str),
}

struct Recorder {
    name: String,
    priority: i64,
    behavior: Behavior,
    journal: Journal,
}

impl Recorder {
    fn new(name: &str, priority: i64, behavior: Behavior, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            priority,
            behavior,
            journal: journal.clone(),
        }
    }
}

impl EventHandler<LoginEvent> for Recorder {
    fn handler_name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> HandlerDescriptor {
        HandlerDescriptor::new(self.priority, format!("{} handler", self.name))
    }

    fn handle(&self, event: &mut LoginEvent) -> anyhow::Result<()> {
        self.journal.lock().unwrap().push(self.name.clone());
        match &self.behavior {
            Behavior::Pass => {}
            Behavior::Fail(msg) => {
                event.state_mut().fail(*msg);
            }
            Behavior::Abort => {
                event.state_mut().abort_with_success();
            }
            Behavior::Error(msg) => anyhow::bail!("{msg}"),
        }
        Ok(())
    }
}

fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

fn ran(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

fn login() -> LoginEvent {
    LoginEvent {
        account: "alice".into(),
        ..Default::default()
    }
}

#[test]
fn scenario_a_fail_stops_chain_in_priority_order() {
    let registry = EventRegistry::new();
    let j = journal();
    registry
        .watch_handler(Recorder::new("h2", 80, Behavior::Fail("bad input"), &j))
        .unwrap();
    registry
        .watch_handler(Recorder::new("h1", 20, Behavior::Pass, &j))
        .unwrap();
    registry
        .watch_handler(Recorder::new("h3", 90, Behavior::Pass, &j))
        .unwrap();

    let event = registry.emit(login());

    assert_eq!(event.result(), ResultState::Fail);
    assert_eq!(event.state().result_message(), "bad input");
    assert_eq!(event.state().result_code(), &ResultCode::Int(0));
    assert!(!event.is_exception());
    assert_eq!(ran(&j), ["h1", "h2"]);
    assert_eq!(event.account, "alice");
}

#[test]
fn scenario_b_equal_priorities_run_in_registration_order() {
    for _ in 0..5 {
        let registry = EventRegistry::new();
        let j = journal();
        for name in ["first", "second", "third"] {
            registry
                .watch_handler(Recorder::new(name, 10, Behavior::Pass, &j))
                .unwrap();
        }
        registry
            .watch_handler(Recorder::new("early", 5, Behavior::Pass, &j))
            .unwrap();

        let event = registry.emit(login());
        assert_eq!(event.result(), ResultState::Success);
        assert!(event.is_success());
        assert_eq!(ran(&j), ["early", "first", "second", "third"]);
    }
}

#[test]
fn scenario_c_block_rule_skips_handler() {
    let registry = EventRegistry::new();
    let j = journal();
    registry
        .watch_handler(Recorder::new("h1", 10, Behavior::Pass, &j))
        .unwrap();
    registry
        .watch_handler(Recorder::new("h2", 20, Behavior::Pass, &j))
        .unwrap();

    let event = registry.emit_with(login(), &SceneRule::new().block(["h1"]));

    assert!(event.is_success());
    assert_eq!(ran(&j), ["h2"]);
}

#[test]
fn scenario_d_fault_aborts_chain_with_index_and_kind() {
    let registry = EventRegistry::new();
    let j = journal();
    registry
        .watch_handler(Recorder::new("h0", 10, Behavior::Pass, &j))
        .unwrap();
    registry
        .watch_handler(Recorder::new("h1", 20, Behavior::Error("connection reset"), &j))
        .unwrap();
    registry
        .watch_handler(Recorder::new("h2", 30, Behavior::Pass, &j))
        .unwrap();

    let event = registry.emit(login());

    assert_eq!(event.result(), ResultState::Fail);
    assert!(event.is_exception());
    assert!(!event.is_success());
    let message = event.state().result_message();
    assert!(message.contains("h1"));
    assert!(message.contains("(1)"));
    assert_eq!(message, "handler execution fault (1): h1");
    match event.state().error().map(|e| e.as_ref()) {
        Some(EventFault::Handler(err)) => assert_eq!(err.to_string(), "connection reset"),
        other => panic!("unexpected fault: {other:?}"),
    }
    assert_eq!(ran(&j), ["h0", "h1"]);
}

#[test]
fn fault_keeps_result_code_set_by_handler() {
    let registry = EventRegistry::new();
    registry
        .watch_handler::<LoginEvent, _>(FnHandler::new(
            "storage",
            HandlerDescriptor::new(10, "storage"),
            |event: &mut LoginEvent| {
                event.state_mut().set_result_code("E_DB");
                anyhow::bail!("disk full")
            },
        ))
        .unwrap();

    let event = registry.emit(login());

    assert_eq!(event.result(), ResultState::Fail);
    assert!(event.is_exception());
    assert_eq!(event.state().result_code(), &ResultCode::from("E_DB"));
    assert_eq!(
        event.state().result_message(),
        "handler execution fault (0): storage"
    );
}

#[test]
fn fault_without_code_keeps_default_code() {
    let registry = EventRegistry::new();
    let j = journal();
    registry
        .watch_handler(Recorder::new("auth", 10, Behavior::Error("timeout"), &j))
        .unwrap();

    let event = registry.emit(login());

    assert!(event.is_exception());
    assert_eq!(event.state().result_code(), &ResultCode::Int(1));
}

#[test]
fn abort_stops_chain_but_reports_success() {
    let registry = EventRegistry::new();
    let j = journal();
    registry
        .watch_handler(Recorder::new("cache", 10, Behavior::Abort, &j))
        .unwrap();
    registry
        .watch_handler(Recorder::new("db", 20, Behavior::Pass, &j))
        .unwrap();

    let event = registry.emit(login());

    assert_eq!(event.result(), ResultState::SuccessAbort);
    assert!(event.is_success());
    assert_eq!(ran(&j), ["cache"]);
}

#[test]
fn empty_chain_returns_event_untouched() {
    let registry = EventRegistry::new();
    let event = registry.emit(AuditEvent::default());
    assert_eq!(event.result(), ResultState::Success);
    assert_eq!(event.state().result_message(), "OK");
    assert!(event.dump().is_empty());
}

#[test]
fn white_rule_limits_handlers_and_block_rule_wins() {
    let registry = EventRegistry::new();
    let j = journal();
    for (name, priority) in [("auth", 10), ("coding", 20), ("menu", 30), ("storage", 40)] {
        registry
            .watch_handler(Recorder::new(name, priority, Behavior::Pass, &j))
            .unwrap();
    }

    let rule = SceneRule::new()
        .white(["auth", "coding", "storage"])
        .block(["storage"]);
    let event = registry.emit_with(login(), &rule);

    assert!(event.is_success());
    assert_eq!(ran(&j), ["auth", "coding"]);
}

#[test]
fn emit_scene_uses_configured_rules() {
    let registry = EventRegistry::new();
    let j = journal();
    for (name, priority) in [("auth", 10), ("menu", 20), ("storage", 30)] {
        registry
            .watch_handler(Recorder::new(name, priority, Behavior::Pass, &j))
            .unwrap();
    }
    registry.import(BusConfig::new().with_scene(
        "login",
        "auth",
        SceneRule::new().white(["auth", "storage"]).block(["storage"]),
    ));

    registry.emit_scene(login(), "auth");
    assert_eq!(ran(&j), ["auth"]);

    // 场景名为空或未配置时不过滤
    j.lock().unwrap().clear();
    registry.emit_scene(login(), "");
    assert_eq!(ran(&j), ["auth", "menu", "storage"]);

    j.lock().unwrap().clear();
    registry.emit_scene(login(), "unknown");
    assert_eq!(ran(&j), ["auth", "menu", "storage"]);
}

#[test]
fn config_materializes_handlers_exactly_once() {
    let registry = EventRegistry::new();
    let j = journal();
    let built = Arc::new(AtomicUsize::new(0));

    for name in ["account_auth", "account_menu", "account_storage"] {
        let j = j.clone();
        let built = built.clone();
        registry.register_factory::<LoginEvent, _, _>(name, move |spec: &HandlerSpec| {
            built.fetch_add(1, Ordering::SeqCst);
            Ok(Recorder::new(name, spec.priority, Behavior::Pass, &j))
        });
    }
    registry
        .import_json(
            r#"{
                "login": {
                    "account_storage": { "priority": 100, "describe": "账户信息存储处理器" },
                    "account_auth": { "priority": 20, "describe": "账户认证处理器" },
                    "account_menu": { "priority": 80, "describe": "账户菜单信息处理器" }
                }
            }"#,
        )
        .unwrap();

    let first = registry.emit(login());
    let second = registry.emit(login());

    assert!(first.is_success());
    assert!(second.is_success());
    assert_eq!(built.load(Ordering::SeqCst), 3);
    assert_eq!(
        ran(&j),
        [
            "account_auth",
            "account_menu",
            "account_storage",
            "account_auth",
            "account_menu",
            "account_storage",
        ]
    );

    let snapshot = registry.export();
    let login_handlers = &snapshot.events["login"];
    assert_eq!(login_handlers.len(), 3);
    assert_eq!(login_handlers["account_auth"].priority(), 20);
    assert_eq!(login_handlers["account_auth"].description(), "账户认证处理器");
}

#[test]
fn missing_factory_fails_the_event_instead_of_panicking() {
    let registry = EventRegistry::new();
    registry.import(BusConfig::new().with_handler("login", "ghost", HandlerSpec::default()));

    let event = registry.emit(login());

    assert_eq!(event.result(), ResultState::Fail);
    assert!(event.is_exception());
    assert!(event.state().result_message().contains("ghost"));
    assert_eq!(event.state().result_code(), &ResultCode::Int(1));
    assert!(matches!(
        event.state().error().map(|e| e.as_ref()),
        Some(EventFault::Registry(BusError::FactoryNotFound { .. }))
    ));
}

#[test]
fn copy_event_exception_propagates_failure_across_event_types() {
    let registry = EventRegistry::new();
    let j = journal();
    registry
        .watch_handler(Recorder::new("auth", 10, Behavior::Error("token expired"), &j))
        .unwrap();

    let failed = registry.emit(login());
    let mut audit = AuditEvent::default();
    audit.state_mut().abort_with_success();
    audit.copy_event_exception(&failed);

    assert_eq!(audit.result(), ResultState::Fail);
    assert_eq!(audit.state().result_code(), failed.state().result_code());
    assert_eq!(audit.state().result_message(), failed.state().result_message());
    assert!(Arc::ptr_eq(
        audit.state().error().unwrap(),
        failed.state().error().unwrap()
    ));
}

#[test]
fn handler_can_emit_other_events_reentrantly() {
    let registry = Arc::new(EventRegistry::new());
    let audits = Arc::new(AtomicUsize::new(0));
    {
        let audits = audits.clone();
        registry
            .watch_handler::<AuditEvent, _>(FnHandler::new(
                "count",
                HandlerDescriptor::default(),
                move |_: &mut AuditEvent| {
                    audits.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
            ))
            .unwrap();
    }
    {
        let inner = registry.clone();
        registry
            .watch_handler::<LoginEvent, _>(FnHandler::new(
                "audit",
                HandlerDescriptor::default(),
                move |event: &mut LoginEvent| {
                    let audit = inner.emit(AuditEvent::default());
                    if !audit.is_success() {
                        event.copy_event_exception(&audit);
                    }
                    Ok(())
                },
            ))
            .unwrap();
    }

    let event = registry.emit(login());
    assert!(event.is_success());
    assert_eq!(audits.load(Ordering::SeqCst), 1);
}

#[test]
fn dump_lists_invoked_handlers_with_their_outcome() {
    let registry = EventRegistry::new();
    let j = journal();
    registry
        .watch_handler(Recorder::new("auth", 10, Behavior::Pass, &j))
        .unwrap();
    registry
        .watch_handler(Recorder::new("menu", 20, Behavior::Fail("no menu"), &j))
        .unwrap();

    let event = registry.emit(login());
    let dump = event.dump();
    let kinds: Vec<&str> = dump.keys().map(String::as_str).collect();

    assert_eq!(kinds, ["auth", "menu"]);
    assert_eq!(dump["auth"].result, ResultState::Success);
    assert_eq!(dump["menu"].result, ResultState::Fail);
    assert_eq!(dump["menu"].result_message, "no menu");
    assert_eq!(dump["menu"].event_kind, "login");
}
