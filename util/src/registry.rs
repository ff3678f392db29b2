use std::{any::Any, collections::HashMap, fmt};

type Factory = Box<dyn Fn() -> Option<Box<dyn Any>>>;

/// Default constructors for generated classes, looked up by name.
#[derive(Default)]
pub struct ClassRegistry {
    factories: HashMap<String, Factory>,
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.factories.keys().collect::<Vec<_>>();
        names.sort();

        f.debug_struct("ClassRegistry").field("names", &names).finish()
    }
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<N, F>(&mut self, name: N, factory: F)
    where
        N: Into<String>,
        F: Fn() -> Option<Box<dyn Any>> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Builds a registry from a generated class map and its `instantiate`
    /// function. Every class is reachable by both its wire name and its
    /// generated name.
    pub fn from_classmap(
        classmap: &[(&'static str, &'static str)],
        instantiate: fn(&str) -> Option<Box<dyn Any>>,
    ) -> Self {
        let mut registry = Self::new();

        for (wire, class) in classmap {
            let wire = *wire;

            registry.register(wire, move || instantiate(wire));
            if !registry.contains(class) {
                registry.register(*class, move || instantiate(wire));
            }
        }

        registry
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// A default value of the class registered under `name`.
    pub fn instantiate(&self, name: &str) -> Option<Box<dyn Any>> {
        self.factories.get(name).and_then(|factory| factory())
    }
}
