use proc_macro::TokenStream;

mod event;
mod field_utils;

/// 事件宏
/// - 若缺失则追加字段 `state: ::chainbus::event::EventState`（可见性与结构体一致）
/// - 自动为目标结构体实现 `::chainbus::event::Event`（`KIND/state/state_mut`）
/// - 支持参数：`#[event(kind = "login", state = field)]`
///   - `kind` 默认为结构体名
///   - `state` 指定承载 `EventState` 的字段名，默认 `state`
#[proc_macro_attribute]
pub fn event(attr: TokenStream, item: TokenStream) -> TokenStream {
    event::expand(attr, item)
}
