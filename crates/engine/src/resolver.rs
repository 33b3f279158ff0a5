use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::{debug, warn};

use monitor_core::CheckModule;

/// 依赖解析器
///
/// 对本次运行选出的模块子集做 Kahn 拓扑排序。入度只统计同样在
/// 子集内的依赖，指向子集外模块的依赖直接忽略。就绪模块之间按
/// 子集原始顺序（优先级排序后的顺序）出队，保证确定性。
///
/// 检测到环时不报错，回退到原始顺序并打一条警告，排序在这种
/// 退化场景下是尽力而为。
pub struct DependencyResolver;

impl DependencyResolver {
    /// 返回依赖有序的模块列表
    pub fn resolve(modules: &[Arc<dyn CheckModule>]) -> Vec<Arc<dyn CheckModule>> {
        if modules.len() <= 1 {
            return modules.to_vec();
        }

        let index_of: HashMap<&str, usize> = modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id(), i))
            .collect();

        // edges[a] = 依赖 a 的模块下标列表
        let mut in_degree: Vec<usize> = vec![0; modules.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); modules.len()];

        for (i, module) in modules.iter().enumerate() {
            for dep in module.dependencies() {
                match index_of.get(dep.module_id.as_str()) {
                    Some(&dep_index) => {
                        in_degree[i] += 1;
                        dependents[dep_index].push(i);
                    }
                    None => {
                        debug!(
                            "模块 {} 的依赖 {} 不在本次运行子集中，忽略",
                            module.id(),
                            dep.module_id
                        );
                    }
                }
            }
        }

        // 队列按原始下标顺序初始化，出队即保持稳定顺序
        let mut queue: VecDeque<usize> = (0..modules.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut ordered: Vec<Arc<dyn CheckModule>> = Vec::with_capacity(modules.len());

        while let Some(i) = queue.pop_front() {
            ordered.push(Arc::clone(&modules[i]));
            // 收集新就绪的模块并按下标排序后入队，维持确定性
            let mut ready: Vec<usize> = Vec::new();
            for &dependent in &dependents[i] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(dependent);
                }
            }
            ready.sort_unstable();
            queue.extend(ready);
        }

        if ordered.len() < modules.len() {
            warn!(
                "模块依赖图存在环（{}/{} 个模块完成排序），回退到原始顺序",
                ordered.len(),
                modules.len()
            );
            return modules.to_vec();
        }

        ordered
    }
}
