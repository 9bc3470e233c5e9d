//! Dependency injection container.
//!
//! Services are registered by name with a factory and a [`Lifetime`]; a
//! [`Scope`] resolves them, caching singletons on the container and scoped
//! services per scope. Resolution tracks a stack of in-flight services so
//! circular dependencies and captive dependencies (a singleton resolving a
//! scoped service) fail with a descriptive error instead of recursing or
//! silently extending a lifetime.
//!
//! # Example
//!
//! ```rust
//! use covenant_core::di::{Container, DiError, Lifetime};
//!
//! struct Config { url: String }
//! struct Repo { config: std::sync::Arc<Config> }
//!
//! let container = Container::builder()
//!     .singleton("Config", |_| Ok(Config { url: "localhost".into() }))
//!     .scoped("Repo", |scope| {
//!         Ok(Repo { config: scope.resolve::<Config>("Config")? })
//!     })
//!     .build();
//!
//! let scope = container.create_scope();
//! let repo = scope.resolve::<Repo>("Repo").unwrap();
//! assert_eq!(repo.config.url, "localhost");
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// How long a resolved service instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// One instance per container, shared by every scope
    Singleton,
    /// One instance per scope
    Scoped,
    /// A fresh instance on every resolution
    Transient,
}

/// Dependency resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// No registration exists under the requested name
    #[error("service not registered: {0}")]
    NotRegistered(String),

    /// The requested service is already being resolved further up the stack
    #[error("circular dependency detected: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),

    /// A singleton factory attempted to resolve a scoped service
    #[error("invalid dependency: singleton service '{dependent}' cannot depend on scoped service '{dependency}'")]
    InvalidDependency {
        dependent: String,
        dependency: String,
    },

    /// A test clone was resolved without overriding this registration
    #[error("service registration not overridden: {0}")]
    NotOverridden(String),

    /// The registered instance is not of the requested type
    #[error("service '{name}' cannot be resolved as {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
}

/// Type-erased service instance.
pub type ServiceInstance = Arc<dyn Any + Send + Sync>;

type ServiceFactory = Arc<dyn Fn(&Scope) -> Result<ServiceInstance, DiError> + Send + Sync>;

#[derive(Clone)]
struct Registration {
    lifetime: Lifetime,
    factory: ServiceFactory,
}

fn erase<T, F>(factory: F) -> ServiceFactory
where
    T: Send + Sync + 'static,
    F: Fn(&Scope) -> Result<T, DiError> + Send + Sync + 'static,
{
    Arc::new(move |scope| Ok(Arc::new(factory(scope)?) as ServiceInstance))
}

// A poisoned lock only means another thread panicked mid-insert; the maps
// stay usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Builder for a [`Container`].
#[derive(Default)]
pub struct ContainerBuilder {
    registrations: HashMap<String, Registration>,
}

impl ContainerBuilder {
    /// Register a service under `name` with an explicit lifetime.
    pub fn register<T, F>(mut self, name: &str, lifetime: Lifetime, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Scope) -> Result<T, DiError> + Send + Sync + 'static,
    {
        self.registrations.insert(
            name.to_string(),
            Registration {
                lifetime,
                factory: erase(factory),
            },
        );
        self
    }

    /// Register a singleton service.
    pub fn singleton<T, F>(self, name: &str, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Scope) -> Result<T, DiError> + Send + Sync + 'static,
    {
        self.register(name, Lifetime::Singleton, factory)
    }

    /// Register a scoped service.
    pub fn scoped<T, F>(self, name: &str, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Scope) -> Result<T, DiError> + Send + Sync + 'static,
    {
        self.register(name, Lifetime::Scoped, factory)
    }

    /// Register a transient service.
    pub fn transient<T, F>(self, name: &str, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Scope) -> Result<T, DiError> + Send + Sync + 'static,
    {
        self.register(name, Lifetime::Transient, factory)
    }

    /// Finalize the registrations.
    pub fn build(self) -> Container {
        Container {
            inner: Arc::new(ContainerInner {
                registrations: self.registrations,
                singletons: Mutex::new(HashMap::new()),
            }),
        }
    }
}

struct ContainerInner {
    registrations: HashMap<String, Registration>,
    singletons: Mutex<HashMap<String, ServiceInstance>>,
}

/// An immutable set of service registrations plus the singleton cache.
///
/// Cloning is cheap and shares both.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    /// Create a resolution scope. Scoped services resolved through it are
    /// cached for its lifetime; singletons are shared with every other
    /// scope of this container.
    pub fn create_scope(&self) -> Scope {
        Scope {
            container: self.inner.clone(),
            scoped: Arc::new(Mutex::new(HashMap::new())),
            stack: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start a test clone: every registration keeps its name and lifetime
    /// but fails with [`DiError::NotOverridden`] until replaced via
    /// [`TestContainerBuilder::override_with`]. Resolving anything that was
    /// not overridden surfaces the missing test setup instead of silently
    /// running production factories.
    pub fn test_clone(&self) -> TestContainerBuilder {
        let registrations = self
            .inner
            .registrations
            .iter()
            .map(|(name, registration)| {
                let stub_name = name.clone();
                let stub: ServiceFactory =
                    Arc::new(move |_| Err(DiError::NotOverridden(stub_name.clone())));
                (
                    name.clone(),
                    Registration {
                        lifetime: registration.lifetime,
                        factory: stub,
                    },
                )
            })
            .collect();
        TestContainerBuilder { registrations }
    }
}

/// Builder produced by [`Container::test_clone`].
pub struct TestContainerBuilder {
    registrations: HashMap<String, Registration>,
}

impl TestContainerBuilder {
    /// Replace the stub for `name` with a real factory. The original
    /// lifetime is preserved.
    pub fn override_with<T, F>(mut self, name: &str, factory: F) -> Result<Self, DiError>
    where
        T: Send + Sync + 'static,
        F: Fn(&Scope) -> Result<T, DiError> + Send + Sync + 'static,
    {
        let registration = self
            .registrations
            .get_mut(name)
            .ok_or_else(|| DiError::NotRegistered(name.to_string()))?;
        registration.factory = erase(factory);
        Ok(self)
    }

    pub fn build(self) -> Container {
        Container {
            inner: Arc::new(ContainerInner {
                registrations: self.registrations,
                singletons: Mutex::new(HashMap::new()),
            }),
        }
    }
}

#[derive(Clone)]
struct Frame {
    name: String,
    lifetime: Lifetime,
}

/// A resolution scope created by [`Container::create_scope`].
#[derive(Clone)]
pub struct Scope {
    container: Arc<ContainerInner>,
    scoped: Arc<Mutex<HashMap<String, ServiceInstance>>>,
    stack: Arc<Mutex<Vec<Frame>>>,
}

impl Scope {
    /// Resolve a service and downcast it to `T`.
    pub fn resolve<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, DiError> {
        self.resolve_dyn(name)?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Resolve a service as a type-erased instance.
    pub fn resolve_dyn(&self, name: &str) -> Result<ServiceInstance, DiError> {
        let registration = self
            .container
            .registrations
            .get(name)
            .ok_or_else(|| DiError::NotRegistered(name.to_string()))?
            .clone();

        self.check_stack(name, registration.lifetime)?;
        let _frame = FrameGuard::push(&self.stack, name, registration.lifetime);

        match registration.lifetime {
            Lifetime::Transient => (registration.factory)(self),
            Lifetime::Singleton => {
                self.resolve_cached(&self.container.singletons, name, &registration)
            }
            Lifetime::Scoped => self.resolve_cached(&self.scoped, name, &registration),
        }
    }

    fn check_stack(&self, name: &str, lifetime: Lifetime) -> Result<(), DiError> {
        let stack = lock(&self.stack);

        if let Some(position) = stack.iter().position(|frame| frame.name == name) {
            let mut path: Vec<String> = stack[position..]
                .iter()
                .map(|frame| frame.name.clone())
                .collect();
            path.push(name.to_string());
            return Err(DiError::CircularDependency(path));
        }

        // Scoped instances must not be captured by a longer-lived singleton.
        if lifetime == Lifetime::Scoped {
            if let Some(parent) = stack
                .iter()
                .rev()
                .find(|frame| frame.lifetime == Lifetime::Singleton)
            {
                return Err(DiError::InvalidDependency {
                    dependent: parent.name.clone(),
                    dependency: name.to_string(),
                });
            }
        }

        Ok(())
    }

    // The cache lock is released while the factory runs so factories can
    // resolve their own dependencies. Under a concurrent race the first
    // insert wins and every caller gets that instance; failures are never
    // cached.
    fn resolve_cached(
        &self,
        cache: &Mutex<HashMap<String, ServiceInstance>>,
        name: &str,
        registration: &Registration,
    ) -> Result<ServiceInstance, DiError> {
        if let Some(hit) = lock(cache).get(name).cloned() {
            return Ok(hit);
        }

        let instance = (registration.factory)(self)?;

        let mut cache = lock(cache);
        Ok(cache
            .entry(name.to_string())
            .or_insert(instance)
            .clone())
    }
}

// Pops the resolution stack even when a factory fails.
struct FrameGuard<'a> {
    stack: &'a Mutex<Vec<Frame>>,
}

impl<'a> FrameGuard<'a> {
    fn push(stack: &'a Mutex<Vec<Frame>>, name: &str, lifetime: Lifetime) -> Self {
        lock(stack).push(Frame {
            name: name.to_string(),
            lifetime,
        });
        Self { stack }
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        lock(self.stack).pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Counter {
        id: u64,
    }

    fn counting_container(lifetime: Lifetime) -> Container {
        let next = std::sync::atomic::AtomicU64::new(0);
        Container::builder()
            .register("Counter", lifetime, move |_| {
                Ok(Counter {
                    id: next.fetch_add(1, std::sync::atomic::Ordering::SeqCst),
                })
            })
            .build()
    }

    #[test]
    fn singleton_is_shared_across_scopes() {
        let container = counting_container(Lifetime::Singleton);
        let a = container.create_scope().resolve::<Counter>("Counter").unwrap();
        let b = container.create_scope().resolve::<Counter>("Counter").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn scoped_is_cached_per_scope() {
        let container = counting_container(Lifetime::Scoped);
        let scope = container.create_scope();
        let a = scope.resolve::<Counter>("Counter").unwrap();
        let b = scope.resolve::<Counter>("Counter").unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let other = container.create_scope().resolve::<Counter>("Counter").unwrap();
        assert!(!Arc::ptr_eq(&a, &other));
        assert_ne!(a.id, other.id);
    }

    #[test]
    fn transient_is_fresh_every_time() {
        let container = counting_container(Lifetime::Transient);
        let scope = container.create_scope();
        let a = scope.resolve::<Counter>("Counter").unwrap();
        let b = scope.resolve::<Counter>("Counter").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unknown_service_fails() {
        let container = Container::builder().build();
        let err = container.create_scope().resolve::<Counter>("Nope").unwrap_err();
        assert_eq!(err, DiError::NotRegistered("Nope".into()));
    }

    #[test]
    fn wrong_type_fails_with_mismatch() {
        let container = Container::builder()
            .singleton("Counter", |_| Ok(Counter { id: 0 }))
            .build();
        let err = container.create_scope().resolve::<String>("Counter").unwrap_err();
        assert!(matches!(err, DiError::TypeMismatch { .. }));
    }

    #[test]
    fn circular_dependency_reports_the_cycle() {
        #[derive(Debug)]
        struct A;
        #[derive(Debug)]
        struct B;
        let container = Container::builder()
            .scoped("A", |scope| {
                scope.resolve::<B>("B")?;
                Ok(A)
            })
            .scoped("B", |scope| {
                scope.resolve::<A>("A")?;
                Ok(B)
            })
            .build();

        let err = container.create_scope().resolve::<A>("A").unwrap_err();
        assert_eq!(
            err,
            DiError::CircularDependency(vec!["A".into(), "B".into(), "A".into()])
        );
        assert_eq!(
            err.to_string(),
            "circular dependency detected: A -> B -> A"
        );
    }

    #[test]
    fn singleton_cannot_capture_scoped() {
        #[derive(Debug)]
        struct Session;
        #[derive(Debug)]
        struct Cache;
        let container = Container::builder()
            .scoped("Session", |_| Ok(Session))
            .singleton("Cache", |scope| {
                scope.resolve::<Session>("Session")?;
                Ok(Cache)
            })
            .build();

        let err = container.create_scope().resolve::<Cache>("Cache").unwrap_err();
        assert_eq!(
            err,
            DiError::InvalidDependency {
                dependent: "Cache".into(),
                dependency: "Session".into(),
            }
        );
    }

    #[test]
    fn transient_under_singleton_is_allowed() {
        struct Id;
        struct Cache;
        let container = Container::builder()
            .transient("Id", |_| Ok(Id))
            .singleton("Cache", |scope| {
                scope.resolve::<Id>("Id")?;
                Ok(Cache)
            })
            .build();

        assert!(container.create_scope().resolve::<Cache>("Cache").is_ok());
    }

    #[test]
    fn failed_factory_is_not_cached() {
        let attempts = Arc::new(std::sync::atomic::AtomicU64::new(0));
        let seen = attempts.clone();
        let container = Container::builder()
            .singleton("Flaky", move |_| {
                if seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                    Err(DiError::NotRegistered("downstream".into()))
                } else {
                    Ok(Counter { id: 1 })
                }
            })
            .build();

        let scope = container.create_scope();
        assert!(scope.resolve::<Counter>("Flaky").is_err());
        assert!(scope.resolve::<Counter>("Flaky").is_ok());
    }

    #[test]
    fn stack_unwinds_after_failure() {
        let container = Container::builder()
            .scoped("A", |scope: &Scope| scope.resolve::<Counter>("Missing").map(|_| ()))
            .build();

        let scope = container.create_scope();
        assert!(scope.resolve::<()>("A").is_err());
        // A second attempt must not be mistaken for a circular resolution.
        let err = scope.resolve::<()>("A").unwrap_err();
        assert!(matches!(err, DiError::NotRegistered(_)));
    }

    #[test]
    fn test_clone_fails_until_overridden() {
        let container = Container::builder()
            .scoped("Logger", |_| Ok(Counter { id: 1 }))
            .build();

        let clone = container.test_clone().build();
        let err = clone.create_scope().resolve::<Counter>("Logger").unwrap_err();
        assert_eq!(err, DiError::NotOverridden("Logger".into()));
    }

    #[test]
    fn test_clone_override_preserves_lifetime() {
        let container = Container::builder()
            .singleton("Counter", |_| Ok(Counter { id: 1 }))
            .build();

        let clone = container
            .test_clone()
            .override_with("Counter", |_| Ok(Counter { id: 42 }))
            .unwrap()
            .build();

        let a = clone.create_scope().resolve::<Counter>("Counter").unwrap();
        let b = clone.create_scope().resolve::<Counter>("Counter").unwrap();
        assert_eq!(a.id, 42);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_clone_override_unknown_name_fails() {
        let container = Container::builder().build();
        let err = container
            .test_clone()
            .override_with("Ghost", |_| Ok(Counter { id: 0 }))
            .err();
        assert_eq!(err, Some(DiError::NotRegistered("Ghost".into())));
    }
}
