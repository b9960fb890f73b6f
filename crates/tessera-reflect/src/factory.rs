// Copyright 2026 the Tessera authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Polymorphic class factories.
//!
//! A [`ClassFactory`] holds, per base trait, one [`Creator`] for each
//! registered concrete type: its registered name, display label,
//! concrete type tag, and a default constructor. Creators are submitted
//! at link time with [`register_class!`](crate::register_class) (backed
//! by `inventory`) and materialized into the factory's lookup maps the
//! first time the factory is used; [`class_factory!`](crate::class_factory)
//! wires a base trait to its lazily-built factory singleton.
//!
//! Runtime [`register`](ClassFactory::register) and
//! [`unregister`](ClassFactory::unregister) exist for hot-reload
//! scenarios; everything else treats the registry as append-only for the
//! process lifetime.

use std::any::Any;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::ReflectError;
use crate::identity::TypeTag;
use crate::serialize::Reflected;

/// A per-derived-type factory record: registered name, display label,
/// concrete type tag, default constructor, and static annotations.
pub struct Creator<B: ?Sized> {
    name: &'static str,
    label: &'static str,
    tag: TypeTag,
    construct: fn() -> Box<B>,
    annotations: &'static [(&'static str, &'static str)],
}

impl<B: ?Sized> Creator<B> {
    /// Builds a creator record. Usually reached through
    /// [`register_class!`](crate::register_class).
    pub fn new(
        name: &'static str,
        label: &'static str,
        tag: TypeTag,
        construct: fn() -> Box<B>,
        annotations: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            name,
            label,
            tag,
            construct,
            annotations,
        }
    }

    /// The registered name — the stable identifier archives store.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The human-readable label shown by edit UIs.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The concrete type's tag.
    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    /// Default-constructs a new instance of the concrete type.
    pub fn create(&self) -> Box<B> {
        (self.construct)()
    }

    /// The creator's static annotation list.
    pub fn annotations(&self) -> &'static [(&'static str, &'static str)] {
        self.annotations
    }
}

/// A link-time creator registration node.
///
/// Type-erased so one `inventory` collection serves every base type: the
/// factory for base `B` materializes only the nodes whose base tag
/// matches, then downcasts each payload back to `Creator<B>`.
pub struct ClassRegistration {
    base: fn() -> TypeTag,
    make: fn() -> Box<dyn Any + Send + Sync>,
}

inventory::collect!(ClassRegistration);

impl ClassRegistration {
    /// Builds a registration node; `make` must return a boxed
    /// `Creator<B>` for the base type reported by `base`.
    pub const fn new(base: fn() -> TypeTag, make: fn() -> Box<dyn Any + Send + Sync>) -> Self {
        Self { base, make }
    }

    /// The tag of the base type this creator registers under.
    pub fn base_tag(&self) -> TypeTag {
        (self.base)()
    }

    fn creator<B: ?Sized + 'static>(&self) -> Option<Creator<B>> {
        (self.make)().downcast::<Creator<B>>().ok().map(|c| *c)
    }
}

/// A base trait with an associated class factory; implemented by
/// [`class_factory!`](crate::class_factory).
///
/// The accessor methods exist because `dyn Base` does not itself
/// satisfy a `Reflected` bound even when `Reflected` is a supertrait of
/// `Base`; the macro-generated bodies reach the supertrait methods
/// through the object's own vtable.
pub trait FactoryBase: 'static {
    /// The process-wide factory for this base, materialized on first
    /// use.
    fn factory() -> &'static ClassFactory<Self>;

    /// The dynamic type tag of a live object behind this base.
    fn dyn_tag(object: &Self) -> TypeTag;

    /// The object viewed through the reflection entry point.
    fn as_reflected(object: &mut Self) -> &mut dyn Reflected;
}

#[derive(Default)]
struct FactoryInner<B: ?Sized> {
    creators: Vec<Creator<B>>,
    by_name: HashMap<&'static str, usize>,
    by_tag: HashMap<TypeTag, usize>,
}

/// The registry of concrete types serializable behind one base trait.
pub struct ClassFactory<B: ?Sized + 'static> {
    base_name: &'static str,
    inner: RwLock<FactoryInner<B>>,
}

impl<B: ?Sized + 'static> ClassFactory<B> {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_name: TypeTag::of_unsized::<B>().name(),
            inner: RwLock::new(FactoryInner {
                creators: Vec::new(),
                by_name: HashMap::new(),
                by_tag: HashMap::new(),
            }),
        }
    }

    /// Materializes every link-time registration submitted for this
    /// base type. Duplicate names are deduplicated (first submission
    /// wins); a duplicate is a registration-macro misuse and trips a
    /// debug assertion.
    #[must_use]
    pub fn from_registrations() -> Self {
        let factory = Self::new();
        let base = TypeTag::of_unsized::<B>();
        let mut count = 0usize;
        for registration in inventory::iter::<ClassRegistration> {
            if registration.base_tag() != base {
                continue;
            }
            let Some(creator) = registration.creator::<B>() else {
                debug_assert!(false, "registration payload mismatch for base {base}");
                continue;
            };
            match factory.register(creator) {
                Ok(()) => count += 1,
                Err(err) => {
                    debug_assert!(false, "{err}");
                    log::warn!("{err}");
                }
            }
        }
        log::debug!("materialized {count} creators for base {base}");
        factory
    }

    /// Registers a creator at runtime.
    pub fn register(&self, creator: Creator<B>) -> Result<(), ReflectError> {
        let mut inner = self.write();
        if inner.by_name.contains_key(creator.name()) {
            return Err(ReflectError::DuplicateCreator {
                base: self.base_name,
                name: creator.name(),
            });
        }
        let index = inner.creators.len();
        inner.by_name.insert(creator.name(), index);
        inner.by_tag.insert(creator.type_tag(), index);
        inner.creators.push(creator);
        Ok(())
    }

    /// Removes one creator by registered name, keeping the remaining
    /// maps consistent. Used by hot-reload.
    pub fn unregister(&self, name: &str) -> Result<(), ReflectError> {
        let mut guard = self.write();
        let inner = &mut *guard;
        let Some(&index) = inner.by_name.get(name) else {
            return Err(ReflectError::UnknownTypeName {
                base: self.base_name,
                name: name.to_string(),
            });
        };
        inner.creators.remove(index);
        inner.by_name.clear();
        inner.by_tag.clear();
        for (i, creator) in inner.creators.iter().enumerate() {
            inner.by_name.insert(creator.name(), i);
            inner.by_tag.insert(creator.type_tag(), i);
        }
        Ok(())
    }

    /// Default-constructs the concrete type registered under `name`.
    /// Returns `None` for an empty or unknown name.
    #[must_use]
    pub fn create(&self, name: &str) -> Option<Box<B>> {
        if name.is_empty() {
            return None;
        }
        let inner = self.read();
        let creator = inner.by_name.get(name).map(|&i| &inner.creators[i]);
        if creator.is_none() {
            log::warn!("base {}: no creator named '{name}'", self.base_name);
        }
        creator.map(Creator::create)
    }

    /// Recovers the registered name of a live object behind the base
    /// trait, via its dynamic type tag. `None` if the concrete type was
    /// never registered.
    #[must_use]
    pub fn registered_type_name(&self, object: &B) -> Option<&'static str>
    where
        B: FactoryBase,
    {
        self.name_of_tag(B::dyn_tag(object))
    }

    /// The registered name for a concrete type tag.
    #[must_use]
    pub fn name_of_tag(&self, tag: TypeTag) -> Option<&'static str> {
        let inner = self.read();
        inner.by_tag.get(&tag).map(|&i| inner.creators[i].name())
    }

    /// The display label registered under `name`.
    #[must_use]
    pub fn label_of(&self, name: &str) -> Option<&'static str> {
        let inner = self.read();
        inner.by_name.get(name).map(|&i| inner.creators[i].label())
    }

    /// The concrete type tag registered under `name`.
    #[must_use]
    pub fn type_tag_of(&self, name: &str) -> Option<TypeTag> {
        let inner = self.read();
        inner.by_name.get(name).map(|&i| inner.creators[i].type_tag())
    }

    /// An annotation value attached to the type registered under
    /// `name`.
    #[must_use]
    pub fn annotation(&self, name: &str, key: &str) -> Option<&'static str> {
        let inner = self.read();
        let &index = inner.by_name.get(name)?;
        inner.creators[index]
            .annotations()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, v)| v)
    }

    /// (name, label) pairs for every registered type, in registration
    /// order — the choice list an edit UI offers for this base.
    #[must_use]
    pub fn type_choices(&self) -> Vec<(&'static str, &'static str)> {
        let inner = self.read();
        inner
            .creators
            .iter()
            .map(|c| (c.name(), c.label()))
            .collect()
    }

    /// Number of registered creators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().creators.len()
    }

    /// `true` if no creators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().creators.is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, FactoryInner<B>> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, FactoryInner<B>> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<B: ?Sized + 'static> Default for ClassFactory<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Implements [`FactoryBase`] for a base trait, giving it a process-wide
/// factory materialized on first use.
///
/// ```rust,ignore
/// trait Shape: Reflected {}
/// class_factory!(Shape);
/// ```
#[macro_export]
macro_rules! class_factory {
    ($base:path) => {
        impl $crate::FactoryBase for dyn $base {
            fn factory() -> &'static $crate::ClassFactory<dyn $base> {
                static FACTORY: ::std::sync::OnceLock<$crate::ClassFactory<dyn $base>> =
                    ::std::sync::OnceLock::new();
                FACTORY.get_or_init($crate::ClassFactory::from_registrations)
            }

            fn dyn_tag(object: &Self) -> $crate::TypeTag {
                object.type_tag()
            }

            fn as_reflected(object: &mut Self) -> &mut dyn $crate::Reflected {
                object.as_reflected_mut()
            }
        }
    };
}

/// Submits a concrete type's creator for a base trait at link time.
///
/// The concrete type must implement `Default` and the base trait. An
/// optional trailing list attaches string annotations queryable through
/// [`ClassFactory::annotation`].
///
/// ```rust,ignore
/// register_class!(Shape, Circle, "Circle", "Circle shape");
/// register_class!(Shape, Box2D, "Box2D", "2D box", annotations: [("icon", "box.png")]);
/// ```
#[macro_export]
macro_rules! register_class {
    ($base:path, $derived:ty, $name:expr, $label:expr) => {
        $crate::register_class!($base, $derived, $name, $label, annotations: []);
    };
    ($base:path, $derived:ty, $name:expr, $label:expr,
     annotations: [$(($akey:expr, $aval:expr)),* $(,)?]) => {
        $crate::inventory::submit! {
            $crate::ClassRegistration::new(
                || $crate::TypeTag::of_unsized::<dyn $base>(),
                || {
                    static ANNOTATIONS: &[(&str, &str)] = &[$(($akey, $aval)),*];
                    ::std::boxed::Box::new($crate::Creator::<dyn $base>::new(
                        $name,
                        $label,
                        $crate::TypeTag::of::<$derived>(),
                        || -> ::std::boxed::Box<dyn $base> {
                            ::std::boxed::Box::new(<$derived as ::std::default::Default>::default())
                        },
                        ANNOTATIONS,
                    ))
                },
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Archive;
    use crate::serialize::Serialize;

    trait Emitter: Reflected {
        fn rate(&self) -> u32;
    }

    #[derive(Default)]
    struct SparkEmitter {
        rate: u32,
    }

    impl Serialize for SparkEmitter {
        fn serialize(&mut self, _ar: &mut dyn Archive) -> bool {
            true
        }
    }

    impl Emitter for SparkEmitter {
        fn rate(&self) -> u32 {
            self.rate
        }
    }

    #[derive(Default)]
    struct SmokeEmitter {}

    impl Serialize for SmokeEmitter {
        fn serialize(&mut self, _ar: &mut dyn Archive) -> bool {
            true
        }
    }

    impl Emitter for SmokeEmitter {
        fn rate(&self) -> u32 {
            0
        }
    }

    crate::class_factory!(Emitter);
    crate::register_class!(Emitter, SparkEmitter, "Spark", "Spark emitter");
    crate::register_class!(
        Emitter,
        SmokeEmitter,
        "Smoke",
        "Smoke emitter",
        annotations: [("icon", "smoke.png")]
    );

    fn test_factory() -> ClassFactory<dyn Emitter> {
        let factory = ClassFactory::<dyn Emitter>::new();
        factory
            .register(Creator::new(
                "Spark",
                "Spark emitter",
                TypeTag::of::<SparkEmitter>(),
                || Box::<SparkEmitter>::default(),
                &[("icon", "spark.png")],
            ))
            .unwrap();
        factory
            .register(Creator::new(
                "Smoke",
                "Smoke emitter",
                TypeTag::of::<SmokeEmitter>(),
                || Box::<SmokeEmitter>::default(),
                &[],
            ))
            .unwrap();
        factory
    }

    #[test]
    fn test_create_by_name() {
        let factory = test_factory();
        let spark = factory.create("Spark").unwrap();
        assert_eq!(
            factory.registered_type_name(spark.as_ref()),
            Some("Spark")
        );
        assert!(factory.create("").is_none());
        assert!(factory.create("Dust").is_none());
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let factory = test_factory();
        let err = factory
            .register(Creator::new(
                "Spark",
                "Spark emitter again",
                TypeTag::of::<SparkEmitter>(),
                || Box::<SparkEmitter>::default(),
                &[],
            ))
            .unwrap_err();
        assert!(matches!(err, ReflectError::DuplicateCreator { .. }));
        assert_eq!(factory.len(), 2);
    }

    #[test]
    fn test_unregister_keeps_maps_consistent() {
        let factory = test_factory();
        factory.unregister("Spark").unwrap();
        assert!(factory.create("Spark").is_none());
        let smoke = factory.create("Smoke").unwrap();
        assert_eq!(factory.registered_type_name(smoke.as_ref()), Some("Smoke"));
        assert!(factory.unregister("Spark").is_err());
    }

    #[test]
    fn test_annotations_and_choices() {
        let factory = test_factory();
        assert_eq!(factory.annotation("Spark", "icon"), Some("spark.png"));
        assert_eq!(factory.annotation("Smoke", "icon"), None);
        assert_eq!(
            factory.type_choices(),
            vec![("Spark", "Spark emitter"), ("Smoke", "Smoke emitter")]
        );
    }

    #[test]
    fn test_link_time_registrations_materialize_once() {
        let factory = <dyn Emitter as FactoryBase>::factory();
        assert_eq!(factory.len(), 2);
        let smoke = factory.create("Smoke").unwrap();
        assert_eq!(smoke.rate(), 0);
        assert_eq!(factory.annotation("Smoke", "icon"), Some("smoke.png"));
        // Re-materializing must not double-register anything.
        let again = ClassFactory::<dyn Emitter>::from_registrations();
        assert_eq!(again.len(), 2);
    }

    #[test]
    fn test_labels_and_tags() {
        let factory = test_factory();
        assert_eq!(factory.label_of("Smoke"), Some("Smoke emitter"));
        assert_eq!(
            factory.type_tag_of("Spark"),
            Some(TypeTag::of::<SparkEmitter>())
        );
        assert_eq!(
            factory.name_of_tag(TypeTag::of::<SmokeEmitter>()),
            Some("Smoke")
        );
    }
}
