//! Reflected fixture types.
//!
//! - [`Hero`]: one field of every scalar kind plus a `"Targets"` table.
//! - [`Targeting`]: derives from [`Hero`] and adds a range and a target.
//! - [`Squad`]: table attributes only, no native fields.

use tessera_core::{Mat4, NodeRef, ReflectError, TypeKey, Vec4};
use tessera_runtime::{rebind_clone, Attributed, NativeField, Reflect, Signature, TypeManager};

// ── Hero ────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Hero {
    attributed: Attributed,
    pub health: NativeField<i32>,
    pub name: NativeField<String>,
    pub position: NativeField<Vec4>,
    pub transform: NativeField<Mat4>,
    pub speed: NativeField<f32>,
    pub scores: NativeField<i32>,
}

impl Hero {
    pub const TYPE_KEY: TypeKey = TypeKey(1);
    pub const SCORE_SLOTS: usize = 3;

    pub fn signatures() -> Vec<Signature> {
        vec![
            Signature::external("Health", 1, |h: &Hero| &h.health),
            Signature::external("Name", 1, |h: &Hero| &h.name),
            Signature::external("Position", 1, |h: &Hero| &h.position),
            Signature::external("Transform", 1, |h: &Hero| &h.transform),
            Signature::external("Speed", 1, |h: &Hero| &h.speed),
            Signature::external("Scores", Self::SCORE_SLOTS, |h: &Hero| &h.scores),
            Signature::table("Targets", 0),
        ]
    }

    pub fn register(types: &mut TypeManager) -> Result<(), ReflectError> {
        types.register_type(Self::TYPE_KEY, Self::signatures())
    }

    pub fn new(types: &TypeManager) -> Result<Self, ReflectError> {
        Self::unbound(types, Self::TYPE_KEY)?.bound()
    }

    /// Fields at their defaults, attributes laid out for `type_key` but
    /// not yet bound.
    fn unbound(types: &TypeManager, type_key: TypeKey) -> Result<Self, ReflectError> {
        Ok(Self {
            attributed: Attributed::new(types, type_key)?,
            health: NativeField::single(100),
            name: NativeField::single(String::from("hero")),
            position: NativeField::single(Vec4::ZERO),
            transform: NativeField::single(Mat4::IDENTITY),
            speed: NativeField::single(1.0),
            scores: NativeField::filled(Self::SCORE_SLOTS, 0),
        })
    }

    fn copy_unbound(&self) -> Self {
        Self {
            attributed: self.attributed.clone(),
            health: self.health.clone(),
            name: self.name.clone(),
            position: self.position.clone(),
            transform: self.transform.clone(),
            speed: self.speed.clone(),
            scores: self.scores.clone(),
        }
    }
}

impl Clone for Hero {
    fn clone(&self) -> Self {
        rebind_clone(self.copy_unbound())
    }
}

impl Reflect for Hero {
    fn attributed(&self) -> &Attributed {
        &self.attributed
    }

    fn attributed_mut(&mut self) -> &mut Attributed {
        &mut self.attributed
    }
}

// ── Targeting ───────────────────────────────────────────────────

#[derive(Debug)]
pub struct Targeting {
    pub hero: Hero,
    pub range: NativeField<f32>,
    pub target: NativeField<NodeRef>,
}

impl Targeting {
    pub const TYPE_KEY: TypeKey = TypeKey(2);

    /// Requires [`Hero`] to be registered first.
    pub fn register(types: &mut TypeManager) -> Result<(), ReflectError> {
        types.register_derived(
            Self::TYPE_KEY,
            Hero::TYPE_KEY,
            |t: &Targeting| &t.hero,
            vec![
                Signature::external("Range", 1, |t: &Targeting| &t.range),
                Signature::external("Target", 1, |t: &Targeting| &t.target),
            ],
        )
    }

    pub fn new(types: &TypeManager) -> Result<Self, ReflectError> {
        Self {
            hero: Hero::unbound(types, Self::TYPE_KEY)?,
            range: NativeField::single(10.0),
            target: NativeField::single(NodeRef::NULL),
        }
        .bound()
    }
}

impl Clone for Targeting {
    fn clone(&self) -> Self {
        rebind_clone(Self {
            hero: self.hero.copy_unbound(),
            range: self.range.clone(),
            target: self.target.clone(),
        })
    }
}

impl Reflect for Targeting {
    fn attributed(&self) -> &Attributed {
        &self.hero.attributed
    }

    fn attributed_mut(&mut self) -> &mut Attributed {
        &mut self.hero.attributed
    }
}

// ── Squad ───────────────────────────────────────────────────────

/// Table-only type: nothing to re-bind, so the derived `Clone` is enough.
#[derive(Clone, Debug)]
pub struct Squad {
    attributed: Attributed,
}

impl Squad {
    pub const TYPE_KEY: TypeKey = TypeKey(3);
    pub const MEMBER_SLOTS: usize = 4;

    pub fn register(types: &mut TypeManager) -> Result<(), ReflectError> {
        types.register_type(
            Self::TYPE_KEY,
            vec![
                Signature::table("Members", Self::MEMBER_SLOTS),
                Signature::table("Reserves", 0),
            ],
        )
    }

    pub fn new(types: &TypeManager) -> Result<Self, ReflectError> {
        Self {
            attributed: Attributed::new(types, Self::TYPE_KEY)?,
        }
        .bound()
    }
}

impl Reflect for Squad {
    fn attributed(&self) -> &Attributed {
        &self.attributed
    }

    fn attributed_mut(&mut self) -> &mut Attributed {
        &mut self.attributed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_runtime::Node;

    #[test]
    fn hero_binds_every_scalar() {
        let types = crate::registry();
        let hero = Hero::new(&types).unwrap();
        assert_eq!(hero.scope().len(), Hero::signatures().len() + 1);
        assert_eq!(hero.scope()["Health"], 100);
        assert_eq!(hero.scope()["Name"], "hero");
        assert_eq!(hero.scope()["Scores"].len(), Hero::SCORE_SLOTS);
        assert!(hero.scope()["Speed"].is_external());
    }

    #[test]
    fn targeting_extends_hero_layout() {
        let types = crate::registry();
        let t = Targeting::new(&types).unwrap();
        let names: Vec<_> = t.scope().keys().collect();
        assert_eq!(names.first(), Some(&"this"));
        assert_eq!(&names[names.len() - 2..], &["Range", "Target"]);

        t.hero.health.set_value(5);
        t.range.set_value(2.5);
        assert_eq!(t.scope()["Health"], 5);
        assert_eq!(t.scope()["Range"], 2.5f32);
    }

    #[test]
    fn targeting_clone_rebinds_base_fields() {
        let types = crate::registry();
        let t = Targeting::new(&types).unwrap();
        let copy = t.clone();
        t.hero.health.set_value(1);
        assert_eq!(copy.scope()["Health"], 100);
        copy.hero.health.set_value(7);
        assert_eq!(copy.scope()["Health"], 7);
    }

    #[test]
    fn squad_reserves_member_slots() {
        let types = crate::registry();
        let squad = Squad::new(&types).unwrap();
        assert_eq!(squad.scope()["Members"].capacity(), Squad::MEMBER_SLOTS);
        assert!(squad.scope()["Reserves"].is_empty());
    }
}
