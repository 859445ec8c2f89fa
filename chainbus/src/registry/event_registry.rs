use super::snapshot::RegistrySnapshot;
use crate::config::{BusConfig, HandlerSpec, HandlerTable, SceneRule, SceneTable};
use crate::error::{BusError, BusResult};
use crate::event::Event;
use crate::handler::{ChainEntry, EventHandler, HandlerChain, HandlerDescriptor};
use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::{ReentrantMutex, RwLock};
use std::any::{Any, type_name};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

type BoxAnyFactory = Arc<dyn Any + Send + Sync>;

type FactoryFn<E> =
    Box<dyn Fn(&HandlerSpec) -> anyhow::Result<Arc<dyn EventHandler<E>>> + Send + Sync>;

// 以事件类型擦除的工厂，注册与取出时均以同一泛型 E 包装/还原
struct HandlerFactory<E: Event>(FactoryFn<E>);

/// 类型擦除后的处理链，便于在同一张表中保存不同事件类型的处理链
trait ErasedChain: Send + Sync {
    fn sort(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: Event> ErasedChain for HandlerChain<E> {
    fn sort(&mut self) {
        HandlerChain::sort(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct ChainSlot {
    type_name: &'static str,
    chain: Box<dyn ErasedChain>,
}

impl ChainSlot {
    fn new<E: Event>() -> Self {
        Self {
            type_name: type_name::<E>(),
            chain: Box::new(HandlerChain::<E>::new()),
        }
    }
}

#[derive(Default)]
struct RegistryState {
    // 待物化的静态配置
    config: HandlerTable,
    scenes: SceneTable,
    chains: HashMap<String, ChainSlot>,
    // 事件类型 -> 已物化的处理器类型 -> 描述
    event_map: IndexMap<String, IndexMap<String, HandlerDescriptor>>,
}

impl RegistryState {
    fn chain_mut<E: Event>(&mut self) -> BusResult<&mut HandlerChain<E>> {
        let slot = self
            .chains
            .entry(E::KIND.to_string())
            .or_insert_with(ChainSlot::new::<E>);
        let found = slot.type_name;
        slot.chain
            .as_any_mut()
            .downcast_mut::<HandlerChain<E>>()
            .ok_or_else(|| type_mismatch::<E>(found))
    }

    fn chain<E: Event>(&self) -> BusResult<Option<&HandlerChain<E>>> {
        let Some(slot) = self.chains.get(E::KIND) else {
            return Ok(None);
        };
        slot.chain
            .as_any()
            .downcast_ref::<HandlerChain<E>>()
            .map(Some)
            .ok_or_else(|| type_mismatch::<E>(slot.type_name))
    }

    fn is_recorded<E: Event>(&self, handler_kind: &str) -> bool {
        self.event_map
            .get(E::KIND)
            .is_some_and(|m| m.contains_key(handler_kind))
    }

    // 配置中列出但尚未物化的处理器
    fn pending<E: Event>(&self) -> Vec<(String, HandlerSpec)> {
        let Some(handlers) = self.config.get(E::KIND) else {
            return Vec::new();
        };
        handlers
            .iter()
            .filter(|(kind, _)| !self.is_recorded::<E>(kind))
            .map(|(kind, spec)| (kind.clone(), spec.clone()))
            .collect()
    }

    fn needs_load<E: Event>(&self) -> BusResult<bool> {
        let unsorted = self.chain::<E>()?.is_some_and(|c| !c.is_sorted());
        Ok(unsorted || !self.pending::<E>().is_empty())
    }

    fn record<E: Event>(&mut self, handler_kind: String, descriptor: HandlerDescriptor) {
        self.event_map
            .entry(E::KIND.to_string())
            .or_default()
            .insert(handler_kind, descriptor);
    }

    fn snapshot<E: Event>(&self) -> BusResult<Vec<ChainEntry<E>>> {
        Ok(self
            .chain::<E>()?
            .map(|c| c.sorted_view().to_vec())
            .unwrap_or_default())
    }
}

fn type_mismatch<E: Event>(found: &'static str) -> BusError {
    BusError::TypeMismatch {
        event: E::KIND.to_string(),
        expected: type_name::<E>(),
        found,
    }
}

/// 事件注册表（EventBus）
///
/// 保存“事件类型 -> 处理链”的映射、待物化的静态配置、场景规则与处理器工厂，并负责分发：
/// - `import`：导入静态配置（整体替换）；
/// - `register_factory`：按 (事件类型, 处理器类型) 注册处理器构造函数；
/// - `watch`：在代码中显式注册处理器；
/// - `emit` / `emit_with` / `emit_scene`：分发事件，见 `dispatcher` 模块；
/// - `export`：导出已物化处理器与场景表。
///
/// 首次分发某事件类型时按配置懒加载处理器，并只排序一次。物化过程由一把可重入的
/// 物化锁串行化并二次检查，并发的首次分发不会重复物化；工厂执行期间不持有状态锁，
/// 因此工厂可以查询注册表。稳态分发仅持有读锁复制处理链快照，
/// 处理器执行期间不持有任何锁，因此处理器内部可以再次分发其他事件。
pub struct EventRegistry {
    state: RwLock<RegistryState>,
    factories: DashMap<(String, String), BoxAnyFactory>,
    // 串行化物化；可重入，工厂内分发其他事件类型不会死锁
    materialize: ReentrantMutex<()>,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            factories: DashMap::new(),
            materialize: ReentrantMutex::new(()),
        }
    }
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级共享实例
    pub fn global() -> &'static EventRegistry {
        static GLOBAL: OnceLock<EventRegistry> = OnceLock::new();
        GLOBAL.get_or_init(EventRegistry::new)
    }

    /// 导入静态配置
    ///
    /// 待物化配置被整体替换（不合并）；仅当配置带有 `scene` 时替换场景表。
    /// 已物化的处理器不受影响。
    pub fn import(&self, config: BusConfig) {
        let mut state = self.state.write();
        tracing::debug!(
            events = config.events.len(),
            has_scene = config.scene.is_some(),
            "importing event config"
        );
        state.config = config.events;
        if let Some(scenes) = config.scene {
            state.scenes = scenes;
        }
    }

    /// 从 JSON 文本导入静态配置
    pub fn import_json(&self, json: &str) -> BusResult<()> {
        self.import(BusConfig::from_json_str(json)?);
        Ok(())
    }

    /// 注册处理器工厂，用于按配置物化 `handler_kind`
    ///
    /// 同一 (事件类型, 处理器类型) 重复注册时覆盖原工厂。
    ///
    /// 工厂执行时不持有注册表的状态锁，可以调用 `scene`、`export`，也可以分发其他事件类型；
    /// 但不得分发自己所属的事件类型，否则会再次触发同一批物化而无限递归。
    pub fn register_factory<E, H, F>(&self, handler_kind: impl Into<String>, factory: F)
    where
        E: Event,
        H: EventHandler<E> + 'static,
        F: Fn(&HandlerSpec) -> anyhow::Result<H> + Send + Sync + 'static,
    {
        let f: FactoryFn<E> = Box::new(move |spec| {
            let handler = factory(spec)?;
            Ok(Arc::new(handler) as Arc<dyn EventHandler<E>>)
        });
        let handler_kind = handler_kind.into();
        tracing::debug!(event = E::KIND, handler = %handler_kind, "registering handler factory");
        self.factories.insert(
            (E::KIND.to_string(), handler_kind),
            Arc::new(HandlerFactory(f)),
        );
    }

    /// 显式注册处理器
    ///
    /// 追加到处理链并以处理器类型名记录描述（此后配置中同名处理器不再物化）；
    /// `sort == false` 时延迟排序，下一次分发前会自动补排。
    pub fn watch<E: Event>(&self, handler: Arc<dyn EventHandler<E>>, sort: bool) -> BusResult<()> {
        let kind = handler.handler_name().to_string();
        let descriptor = handler.descriptor();

        let mut state = self.state.write();
        let chain = state.chain_mut::<E>()?;
        chain.append(ChainEntry::new(kind.as_str(), descriptor.clone(), handler));
        if sort {
            chain.sort();
        }
        tracing::debug!(
            event = E::KIND,
            handler = %kind,
            priority = descriptor.priority(),
            "handler watched"
        );
        state.record::<E>(kind, descriptor);
        Ok(())
    }

    /// 注册处理器并立即排序
    pub fn watch_handler<E, H>(&self, handler: H) -> BusResult<()>
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        self.watch::<E>(Arc::new(handler), true)
    }

    /// 对某一事件类型的处理链排序
    pub fn sort<E: Event>(&self) -> BusResult<()> {
        let mut state = self.state.write();
        if state.chain::<E>()?.is_some() {
            state.chain_mut::<E>()?.sort();
        }
        Ok(())
    }

    /// 对所有处理链排序
    pub fn sort_all(&self) {
        let mut state = self.state.write();
        for slot in state.chains.values_mut() {
            slot.chain.sort();
        }
    }

    /// 查询场景规则
    pub fn scene(&self, event_kind: &str, scene_name: &str) -> Option<SceneRule> {
        let state = self.state.read();
        state.scenes.get(event_kind)?.get(scene_name).cloned()
    }

    /// 导出已物化处理器的描述与场景表
    pub fn export(&self) -> RegistrySnapshot {
        let state = self.state.read();
        RegistrySnapshot {
            scene: state.scenes.clone(),
            events: state.event_map.clone(),
        }
    }

    /// 确保处理链已按配置物化并排序，返回按优先级排列的快照
    pub(crate) fn ensure_loaded<E: Event>(&self) -> BusResult<Vec<ChainEntry<E>>> {
        {
            let state = self.state.read();
            if !state.needs_load::<E>()? {
                return state.snapshot::<E>();
            }
        }

        let _guard = self.materialize.lock();
        // 二次检查：等待物化锁期间可能已被其他线程物化
        let pending = {
            let state = self.state.read();
            if !state.needs_load::<E>()? {
                return state.snapshot::<E>();
            }
            state.pending::<E>()
        };

        let mut first_err: Option<BusError> = None;
        let mut built = Vec::with_capacity(pending.len());

        for (kind, spec) in pending {
            match self.build::<E>(&kind, &spec) {
                Ok(handler) => built.push((kind, spec.descriptor(), handler)),
                Err(err) => {
                    tracing::error!(event = E::KIND, handler = %kind, error = %err, "handler materialization failed");
                    first_err.get_or_insert(err);
                }
            }
        }

        let mut state = self.state.write();
        // 工厂执行期间可能有同名处理器经 `watch` 注册，以已记录者为准
        built.retain(|(kind, _, _)| !state.is_recorded::<E>(kind));
        let chain = state.chain_mut::<E>()?;
        let loaded = built.len();
        for (kind, descriptor, handler) in &built {
            chain.append(ChainEntry::new(kind.as_str(), descriptor.clone(), handler.clone()));
        }
        chain.sort();
        for (kind, descriptor, _) in built {
            state.record::<E>(kind, descriptor);
        }
        if loaded > 0 {
            tracing::debug!(event = E::KIND, loaded, "handlers materialized from config");
        }

        match first_err {
            Some(err) => Err(err),
            None => state.snapshot::<E>(),
        }
    }

    fn build<E: Event>(&self, handler_kind: &str, spec: &HandlerSpec) -> BusResult<Arc<dyn EventHandler<E>>> {
        let key = (E::KIND.to_string(), handler_kind.to_string());
        let Some(factory) = self.factories.get(&key).map(|f| f.clone()) else {
            return Err(BusError::FactoryNotFound {
                event: key.0,
                handler: key.1,
            });
        };
        let factory = factory
            .downcast::<HandlerFactory<E>>()
            .map_err(|_| type_mismatch::<E>("unknown"))?;

        let materialize_err = |reason: String| BusError::Materialize {
            event: E::KIND.to_string(),
            handler: handler_kind.to_string(),
            reason,
        };
        match panic::catch_unwind(AssertUnwindSafe(|| (factory.0)(spec))) {
            Ok(Ok(handler)) => Ok(handler),
            Ok(Err(err)) => Err(materialize_err(format!("{err:#}"))),
            Err(payload) => Err(materialize_err(
                crate::error::EventFault::from_panic(payload).to_string(),
            )),
        }
    }
}
