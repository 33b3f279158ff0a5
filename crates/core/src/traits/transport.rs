use std::any::Any;

/// 不透明的传输句柄
///
/// 引擎只负责把它原样传给每个模块的 `run`，从不检查内部结构。
/// 具体实现通常包装一个 RPC 客户端，模块通过 `as_any` 向下转型
/// 取回自己认识的类型。
pub trait Transport: Send + Sync {
    /// 连接端点描述，仅用于日志
    fn endpoint(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}
