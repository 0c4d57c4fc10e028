//! 适配器注册表
//!
//! 同一 URL 被多个适配器接受时, 先注册者优先. 这是约定, 不做重叠校验.

use tracing::debug;

use crate::traits::{Contest, Problem, Service};

/// 某一实体种类的适配器工厂
pub struct Factory<T: ?Sized> {
    pub name: &'static str,
    pub from_url: fn(url: &str) -> Option<Box<T>>,
}

impl<T: ?Sized> Clone for Factory<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            from_url: self.from_url,
        }
    }
}

/// 注册项, 由 `#[derive(SiteAdapter)]` 生成
#[derive(Clone)]
pub enum RegistryItem {
    Service(Factory<dyn Service>),
    Contest(Factory<dyn Contest>),
    Problem(Factory<dyn Problem>),
}

/// 适配器注册表
///
/// 启动时构造一次并注入, 只追加不删除.
#[derive(Clone, Default)]
pub struct Registry {
    services: Vec<Factory<dyn Service>>,
    contests: Vec<Factory<dyn Contest>>,
    problems: Vec<Factory<dyn Problem>>,
}

impl Registry {
    /// 空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置适配器, 按固定顺序注册
    pub fn with_builtin_adapters() -> Self {
        let mut registry = Self::new();
        for item in crate::services::registry_items() {
            registry.register(item);
        }
        registry
    }

    pub fn register(&mut self, item: RegistryItem) {
        match item {
            RegistryItem::Service(f) => self.register_service(f),
            RegistryItem::Contest(f) => self.register_contest(f),
            RegistryItem::Problem(f) => self.register_problem(f),
        }
    }

    pub fn register_service(&mut self, factory: Factory<dyn Service>) {
        self.services.push(factory);
    }

    pub fn register_contest(&mut self, factory: Factory<dyn Contest>) {
        self.contests.push(factory);
    }

    pub fn register_problem(&mut self, factory: Factory<dyn Problem>) {
        self.problems.push(factory);
    }

    pub fn resolve_service(&self, url: &str) -> Option<Box<dyn Service>> {
        first_match(&self.services, url)
    }

    pub fn resolve_contest(&self, url: &str) -> Option<Box<dyn Contest>> {
        first_match(&self.contests, url)
    }

    pub fn resolve_problem(&self, url: &str) -> Option<Box<dyn Problem>> {
        first_match(&self.problems, url)
    }

    /// 接受该 URL 的全部服务适配器, 按注册顺序
    pub fn matching_service_adapters(&self, url: &str) -> Vec<&'static str> {
        all_matches(&self.services, url)
    }

    pub fn matching_contest_adapters(&self, url: &str) -> Vec<&'static str> {
        all_matches(&self.contests, url)
    }

    pub fn matching_problem_adapters(&self, url: &str) -> Vec<&'static str> {
        all_matches(&self.problems, url)
    }
}

fn first_match<T: ?Sized>(factories: &[Factory<T>], url: &str) -> Option<Box<T>> {
    factories.iter().find_map(|f| {
        let found = (f.from_url)(url);
        if found.is_some() {
            debug!(adapter = f.name, url, "resolved");
        }
        found
    })
}

fn all_matches<T: ?Sized>(factories: &[Factory<T>], url: &str) -> Vec<&'static str> {
    factories
        .iter()
        .filter(|f| (f.from_url)(url).is_some())
        .map(|f| f.name)
        .collect()
}
