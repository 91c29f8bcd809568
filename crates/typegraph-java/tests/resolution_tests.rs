//! End-to-end resolution tests over an in-memory store.
//!
//! Each scenario seeds a store with a core library, a third-party library
//! and a project, then builds the models the way a resolver run does.

use std::sync::Arc;

use typegraph_core::diagnostics::Anomaly;
use typegraph_core::progress::TaskProgress;
use typegraph_core::store::{InMemoryStore, NewEntity, RelationRecord};
use typegraph_core::types::{EntityId, EntityKind, Origin, ProjectId, RelationKind};
use typegraph_java::{Binding, LibraryTypeModel, ProjectTypeModel, UnknownEntityCache};

const UNKNOWNS: ProjectId = ProjectId(0);
const CORE: ProjectId = ProjectId(1);
const LIB: ProjectId = ProjectId(2);
const PROJECT: ProjectId = ProjectId(3);

// ============================================================================
// Fixture
// ============================================================================

struct Fixture {
    store: InMemoryStore,
}

impl Fixture {
    /// Store with `java.lang.Object` (declaring `hashCode()` and `toString()`)
    /// and `java.lang.Number` in the core library.
    fn new() -> Self {
        let fixture = Fixture {
            store: InMemoryStore::new(),
        };
        let object = fixture.declare(CORE, EntityKind::Class, "java.lang.Object");
        fixture.declare(CORE, EntityKind::Method, "java.lang.Object.hashCode()");
        fixture.declare(CORE, EntityKind::Method, "java.lang.Object.toString()");
        let number = fixture.declare(CORE, EntityKind::Class, "java.lang.Number");
        fixture.relate(CORE, RelationKind::Extends, number, object);
        fixture
    }

    fn declare(&self, project: ProjectId, kind: EntityKind, fqn: &str) -> EntityId {
        self.store
            .declare(NewEntity::new(project, kind, fqn))
            .expect("declare")
    }

    fn relate(&self, project: ProjectId, kind: RelationKind, lhs: EntityId, rhs: EntityId) {
        self.store
            .relate(RelationRecord::new(kind, lhs, rhs, project))
            .expect("relate");
    }

    fn library(&self) -> Arc<LibraryTypeModel> {
        let mut progress = TaskProgress::new();
        let core = LibraryTypeModel::build_virtual(&mut progress, &self.store, &[CORE], None)
            .expect("core model");
        let library =
            LibraryTypeModel::build_virtual(&mut progress, &self.store, &[LIB], Some(&core))
                .expect("library model");
        Arc::new(library)
    }

    fn project(&self) -> ProjectTypeModel<'_> {
        ProjectTypeModel::build_virtual(
            &mut TaskProgress::new(),
            &self.store,
            PROJECT,
            self.library(),
            Arc::new(UnknownEntityCache::new(UNKNOWNS)),
        )
        .expect("project model")
    }
}

fn fqn_of(model: &ProjectTypeModel<'_>, binding: &Binding) -> Vec<String> {
    binding
        .candidates()
        .iter()
        .map(|&r| model.entity(r).expect("entity").fqn().to_string())
        .collect()
}

// ============================================================================
// Plain resolution
// ============================================================================

mod plain {
    use super::*;

    #[test]
    fn repeated_lookups_are_identical() {
        let fixture = Fixture::new();
        fixture.declare(PROJECT, EntityKind::Class, "p.A");
        let mut model = fixture.project();

        for fqn in ["p.A", "java.lang.Object", "p.A[]", "x.Missing"] {
            let first = model.get_entity(fqn).unwrap();
            assert_eq!(model.get_entity(fqn).unwrap(), first, "{fqn}");
        }
    }

    #[test]
    fn same_compound_inserts_one_row() {
        let fixture = Fixture::new();
        let mut model = fixture.project();
        let before = fixture.store.entity_count().unwrap();

        model.get_entity("java.lang.Object[][]").unwrap();
        model.get_entity("java.lang.Object[][]").unwrap();

        assert_eq!(fixture.store.entity_count().unwrap(), before + 1);
        let rows = fixture.store.entities_named("java.lang.Object[][]").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, EntityKind::Array);
        assert_eq!(rows[0].dimensions, Some(2));
        assert_eq!(rows[0].project_id, PROJECT);
    }

    #[test]
    fn nested_compound_links_every_part_once() {
        let fixture = Fixture::new();
        let list = fixture.declare(LIB, EntityKind::Interface, "java.util.List");
        let number = fixture.store.entities_named("java.lang.Number").unwrap()[0].entity_id;
        let mut model = fixture.project();
        let before = fixture.store.entity_count().unwrap();

        let array = model
            .get_entity("java.util.List<? extends java.lang.Number>[]")
            .unwrap();
        // Looking up a part afterwards must reuse the synthesized row.
        model
            .get_entity("java.util.List<? extends java.lang.Number>")
            .unwrap();

        assert_eq!(fixture.store.entity_count().unwrap(), before + 3);

        let array = model.entity(array).unwrap();
        assert_eq!(array.kind(), EntityKind::Array);
        let elements = fixture.store.relations_from(array.entity_id()).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind, RelationKind::HasElementsOf);
        assert_eq!(elements[0].origin, Origin::NotApplicable);

        let parameterized = fixture
            .store
            .entity(elements[0].rhs)
            .unwrap()
            .expect("parameterized row");
        assert_eq!(parameterized.kind, EntityKind::ParameterizedType);
        assert_eq!(parameterized.fqn, "java.util.List<? extends java.lang.Number>");

        let parts = fixture.store.relations_from(parameterized.entity_id).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].kind, RelationKind::HasBaseType);
        assert_eq!(parts[0].rhs, list);
        assert_eq!(parts[0].origin, Origin::Library);
        assert_eq!(parts[1].kind, RelationKind::HasTypeArgument);

        let wildcard = fixture
            .store
            .entity(parts[1].rhs)
            .unwrap()
            .expect("wildcard row");
        assert_eq!(wildcard.kind, EntityKind::Wildcard);
        let bound = fixture.store.relations_from(wildcard.entity_id).unwrap();
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].kind, RelationKind::HasUpperBound);
        assert_eq!(bound[0].rhs, number);
    }

    #[test]
    fn lower_bounded_wildcard_uses_lower_bound_relation() {
        let fixture = Fixture::new();
        let mut model = fixture.project();
        let wildcard = model.get_entity("<?-java.lang.Number>").unwrap();
        let id = model.entity(wildcard).unwrap().entity_id();
        let relations = fixture.store.relations_from(id).unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].kind, RelationKind::HasLowerBound);
    }

    #[test]
    fn unresolvable_constituent_links_to_placeholder() {
        let fixture = Fixture::new();
        let mut model = fixture.project();
        let array = model.get_entity("x.Missing[]").unwrap();
        let id = model.entity(array).unwrap().entity_id();
        let relations = fixture.store.relations_from(id).unwrap();
        assert_eq!(relations[0].origin, Origin::Unknown);
        let placeholder = fixture.store.entity(relations[0].rhs).unwrap().unwrap();
        assert_eq!(placeholder.kind, EntityKind::Unknown);
        assert_eq!(placeholder.project_id, UNKNOWNS);
    }

    #[test]
    fn generic_declaration_answers_to_signature_names() {
        let fixture = Fixture::new();
        fixture
            .store
            .declare(
                NewEntity::new(PROJECT, EntityKind::Class, "p.Box")
                    .with_params("<T+java.lang.Object>")
                    .with_raw_params("<T>"),
            )
            .unwrap();
        let mut model = fixture.project();
        let declared = model.get_entity("p.Box<T+java.lang.Object>").unwrap();
        assert_eq!(model.get_entity("p.Box<T>").unwrap(), declared);
        assert_eq!(model.entity(declared).unwrap().kind(), EntityKind::Class);
    }

    #[test]
    fn overloaded_methods_load_without_anomalies() {
        let fixture = Fixture::new();
        for params in ["(int)", "(java.util.List<java.lang.String>)"] {
            fixture
                .store
                .declare(NewEntity::new(PROJECT, EntityKind::Method, "p.A.m").with_params(params))
                .unwrap();
        }
        let mut model = fixture.project();
        assert!(model.anomalies().is_empty(), "{:?}", model.anomalies());

        let int = model.get_entity("p.A.m(int)").unwrap();
        let list = model.get_entity("p.A.m(java.util.List<java.lang.String>)").unwrap();
        assert_ne!(int, list);
        assert_eq!(model.entity(int).unwrap().kind(), EntityKind::Method);
    }
}

// ============================================================================
// Virtual dispatch
// ============================================================================

mod virtual_dispatch {
    use super::*;

    #[test]
    fn compound_type_names_are_synthesized_not_dispatched() {
        let fixture = Fixture::new();
        fixture.declare(PROJECT, EntityKind::Class, "p.A");
        let mut model = fixture.project();

        let binding = model
            .get_virtual_entity("java.util.List<? extends java.lang.Number>[]")
            .unwrap();
        assert!(binding.is_resolved());
        let array = model.entity(binding.candidates()[0]).unwrap();
        assert_eq!(array.kind(), EntityKind::Array);
        assert_eq!(array.origin(), Origin::NotApplicable);

        let binding = model.get_virtual_entity("p.A[]").unwrap();
        let array = model.entity(binding.candidates()[0]).unwrap();
        assert_eq!(array.kind(), EntityKind::Array);
        assert_eq!(model.get_entity("p.A[]").unwrap(), binding.candidates()[0]);
        assert_eq!(model.memoized("p.A[]"), None);
        let rows = fixture.store.entities_named("p.A[]").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, EntityKind::Array);
        assert_eq!(rows[0].project_id, PROJECT);
    }

    #[test]
    fn inherited_library_method_is_memoized() {
        let fixture = Fixture::new();
        let b = fixture.declare(LIB, EntityKind::Class, "lib.B");
        fixture.declare(LIB, EntityKind::Method, "lib.B.m()");
        let a = fixture.declare(PROJECT, EntityKind::Class, "p.A");
        fixture.relate(PROJECT, RelationKind::Extends, a, b);
        let mut model = fixture.project();

        let binding = model.get_virtual_entity("p.A.m()").unwrap();
        assert!(binding.is_resolved());
        assert_eq!(fqn_of(&model, &binding), vec!["lib.B.m()"]);
        assert_eq!(model.memoized("p.A.m()"), Some(&binding));
        assert_eq!(model.get_virtual_entity("p.A.m()").unwrap(), binding);
    }

    #[test]
    fn parameterized_supertype_is_collapsed_to_base() {
        let fixture = Fixture::new();
        let b = fixture.declare(LIB, EntityKind::Class, "lib.B");
        fixture.declare(LIB, EntityKind::Method, "lib.B.m()");
        let a = fixture.declare(PROJECT, EntityKind::Class, "p.A");
        let b_string = fixture.declare(
            PROJECT,
            EntityKind::ParameterizedType,
            "lib.B<java.lang.String>",
        );
        fixture.relate(PROJECT, RelationKind::HasBaseType, b_string, b);
        fixture.relate(PROJECT, RelationKind::Extends, a, b_string);
        let mut model = fixture.project();

        let binding = model.get_virtual_entity("p.A.m()").unwrap();
        assert_eq!(fqn_of(&model, &binding), vec!["lib.B.m()"]);
    }

    #[test]
    fn two_interfaces_are_ambiguous() {
        let fixture = Fixture::new();
        let i1 = fixture.declare(LIB, EntityKind::Interface, "lib.I1");
        let i2 = fixture.declare(LIB, EntityKind::Interface, "lib.I2");
        fixture.declare(LIB, EntityKind::Method, "lib.I1.m()");
        fixture.declare(LIB, EntityKind::Method, "lib.I2.m()");
        let a = fixture.declare(PROJECT, EntityKind::Class, "p.A");
        fixture.relate(PROJECT, RelationKind::Implements, a, i1);
        fixture.relate(PROJECT, RelationKind::Implements, a, i2);
        let mut model = fixture.project();

        let binding = model.get_virtual_entity("p.A.m()").unwrap();
        assert!(binding.is_ambiguous());
        let mut targets = fqn_of(&model, &binding);
        targets.sort();
        assert_eq!(targets, vec!["lib.I1.m()", "lib.I2.m()"]);
        assert!(model.anomalies().is_empty());
    }

    #[test]
    fn class_method_wins_over_interface() {
        let fixture = Fixture::new();
        let i = fixture.declare(LIB, EntityKind::Interface, "lib.I");
        let b = fixture.declare(PROJECT, EntityKind::Class, "p.B");
        fixture.declare(LIB, EntityKind::Method, "lib.I.m()");
        fixture.declare(PROJECT, EntityKind::Method, "p.B.m()");
        let a = fixture.declare(PROJECT, EntityKind::Class, "p.A");
        fixture.relate(PROJECT, RelationKind::Implements, a, i);
        fixture.relate(PROJECT, RelationKind::Extends, a, b);
        let mut model = fixture.project();

        let binding = model.get_virtual_entity("p.A.m()").unwrap();
        assert_eq!(fqn_of(&model, &binding), vec!["p.B.m()"]);
    }

    #[test]
    fn array_receiver_dispatches_to_object() {
        let fixture = Fixture::new();
        let mut model = fixture.project();

        let binding = model.get_virtual_entity("p.T[].hashCode()").unwrap();
        let library = Arc::clone(model.library());
        assert_eq!(
            binding,
            Binding::Resolved(library.get_entity("java.lang.Object.hashCode()").unwrap())
        );
    }

    #[test]
    fn receiver_outside_project_defers_to_library() {
        let fixture = Fixture::new();
        let mut model = fixture.project();

        let binding = model.get_virtual_entity("java.lang.Number.toString()").unwrap();
        assert_eq!(fqn_of(&model, &binding), vec!["java.lang.Object.toString()"]);

        let missing = model.get_virtual_entity("x.Missing.m()").unwrap();
        assert!(matches!(missing, Binding::Unresolved(_)));
    }

    #[test]
    fn undeclared_member_gets_placeholder() {
        let fixture = Fixture::new();
        let object = fixture.store.entities_named("java.lang.Object").unwrap()[0].entity_id;
        let a = fixture.declare(PROJECT, EntityKind::Class, "p.A");
        fixture.relate(PROJECT, RelationKind::Extends, a, object);
        let mut model = fixture.project();

        let binding = model.get_virtual_entity("p.A.nothing()").unwrap();
        let Binding::Unresolved(placeholder) = binding else {
            panic!("expected placeholder, got {binding:?}");
        };
        assert_eq!(model.entity(placeholder).unwrap().fqn(), "p.A.nothing()");
        assert_eq!(model.get_entity("p.A.nothing()").unwrap(), placeholder);
    }

    #[test]
    fn ambiguous_field_is_recorded() {
        let fixture = Fixture::new();
        let i1 = fixture.declare(LIB, EntityKind::Interface, "lib.I1");
        let i2 = fixture.declare(LIB, EntityKind::Interface, "lib.I2");
        fixture.declare(LIB, EntityKind::Field, "lib.I1.X");
        fixture.declare(LIB, EntityKind::Field, "lib.I2.X");
        let a = fixture.declare(PROJECT, EntityKind::Class, "p.A");
        fixture.relate(PROJECT, RelationKind::Implements, a, i1);
        fixture.relate(PROJECT, RelationKind::Implements, a, i2);
        let mut model = fixture.project();

        let binding = model.get_virtual_entity("p.A.X").unwrap();
        assert!(binding.is_ambiguous());
        assert!(matches!(
            model.anomalies(),
            [Anomaly::AmbiguousField { fqn, .. }] if fqn == "p.A.X"
        ));
    }

    #[test]
    fn inherited_field_resolves_through_library() {
        let fixture = Fixture::new();
        let b = fixture.declare(LIB, EntityKind::Class, "lib.B");
        let c = fixture.declare(LIB, EntityKind::Class, "lib.C");
        fixture.declare(LIB, EntityKind::Field, "lib.C.count");
        fixture.relate(LIB, RelationKind::Extends, b, c);
        let mut model = fixture.project();

        let binding = model.get_virtual_entity("lib.B.count").unwrap();
        assert_eq!(fqn_of(&model, &binding), vec!["lib.C.count"]);
    }
}

// ============================================================================
// Malformed data
// ============================================================================

mod malformed {
    use super::*;

    #[test]
    fn edge_with_unknown_child_is_skipped() {
        let fixture = Fixture::new();
        let b = fixture.declare(LIB, EntityKind::Class, "lib.B");
        fixture.declare(LIB, EntityKind::Method, "lib.B.m()");
        let a = fixture.declare(PROJECT, EntityKind::Class, "p.A");
        fixture.relate(PROJECT, RelationKind::Extends, EntityId::new(9_999), b);
        fixture.relate(PROJECT, RelationKind::Extends, a, b);
        let mut model = fixture.project();

        assert_eq!(
            model.anomalies(),
            &[Anomaly::MissingChild {
                entity_id: EntityId::new(9_999)
            }]
        );
        let binding = model.get_virtual_entity("p.A.m()").unwrap();
        assert_eq!(fqn_of(&model, &binding), vec!["lib.B.m()"]);
    }

    #[test]
    fn edge_with_unknown_parent_is_skipped() {
        let fixture = Fixture::new();
        let a = fixture.declare(PROJECT, EntityKind::Class, "p.A");
        fixture.relate(PROJECT, RelationKind::Extends, a, EntityId::new(9_999));
        let model = fixture.project();

        assert_eq!(
            model.anomalies(),
            &[Anomaly::MissingParent {
                entity_id: EntityId::new(9_999)
            }]
        );
    }

    #[test]
    fn duplicate_project_fqn_keeps_first() {
        let fixture = Fixture::new();
        let first = fixture.declare(PROJECT, EntityKind::Class, "p.Dup");
        fixture.declare(PROJECT, EntityKind::Interface, "p.Dup");
        let mut model = fixture.project();

        let found = model.get_entity("p.Dup").unwrap();
        assert_eq!(model.entity(found).unwrap().entity_id(), first);
        assert!(matches!(
            model.anomalies(),
            [Anomaly::DuplicateFqn { fqn }] if fqn == "p.Dup"
        ));
    }

    #[test]
    fn cyclic_hierarchy_resolves_to_placeholder() {
        let fixture = Fixture::new();
        let a = fixture.declare(PROJECT, EntityKind::Class, "p.A");
        let b = fixture.declare(PROJECT, EntityKind::Class, "p.B");
        fixture.relate(PROJECT, RelationKind::Extends, a, b);
        fixture.relate(PROJECT, RelationKind::Extends, b, a);
        let mut model = fixture.project();

        let binding = model.get_virtual_entity("p.A.m()").unwrap();
        assert!(matches!(binding, Binding::Unresolved(_)));
    }
}

// ============================================================================
// Shared unknowns
// ============================================================================

#[test]
fn unknowns_are_shared_across_projects() {
    let fixture = Fixture::new();
    let library = fixture.library();
    let unknowns = Arc::new(UnknownEntityCache::new(UNKNOWNS));
    let other = ProjectId(4);

    let mut first = ProjectTypeModel::build_plain(
        &mut TaskProgress::new(),
        &fixture.store,
        PROJECT,
        Arc::clone(&library),
        Arc::clone(&unknowns),
    )
    .unwrap();
    let mut second = ProjectTypeModel::build_plain(
        &mut TaskProgress::new(),
        &fixture.store,
        other,
        library,
        Arc::clone(&unknowns),
    )
    .unwrap();

    let a = first.get_entity("x.Missing").unwrap();
    let b = second.get_entity("x.Missing").unwrap();
    assert_eq!(
        first.entity(a).unwrap().entity_id(),
        second.entity(b).unwrap().entity_id()
    );
    assert_eq!(unknowns.len().unwrap(), 1);

    let c = first.get_entity("x.Other").unwrap();
    assert_ne!(
        first.entity(a).unwrap().entity_id(),
        first.entity(c).unwrap().entity_id()
    );
    assert_eq!(unknowns.len().unwrap(), 2);
}
