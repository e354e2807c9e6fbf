//! Integration tests for the stripping pipeline.
//!
//! The fixture mirrors a small Windows Forms application: plain classes that reference
//! each other, a form with its designer resources, nested and generic classes, and
//! references to mscorlib, System.Drawing and System.Windows.Forms. Dependencies are
//! resolved through a `StaticResolver` holding minimal framework modules.

use std::sync::Arc;

use ilstrip::prelude::*;

const NAMESPACE: &str = "ILStripTest";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn v4() -> AssemblyVersion {
    AssemblyVersion::new(4, 0, 0, 0)
}

fn framework() -> Result<Arc<StaticResolver>> {
    let mut mscorlib = ModuleBuilder::new("mscorlib");
    let object = mscorlib.add_type(TypeBuilder::new("System", "Object").public())?;
    mscorlib.add_type(
        TypeBuilder::new("System", "Attribute")
            .public()
            .extends(object),
    )?;
    mscorlib.add_type(
        TypeBuilder::new("System.Collections.Generic", "List`1")
            .public()
            .extends(object)
            .generic_param(GenericParam::new(0, "T")),
    )?;

    let mut drawing = ModuleBuilder::new("System.Drawing");
    let core = drawing.assembly_ref("mscorlib", v4());
    let base = drawing.type_ref(core, "System", "Object");
    drawing.add_type(
        TypeBuilder::new("System.Drawing", "Image")
            .public()
            .extends(base),
    )?;

    let mut forms = ModuleBuilder::new("System.Windows.Forms");
    let core = forms.assembly_ref("mscorlib", v4());
    let base = forms.type_ref(core, "System", "Object");
    forms.add_type(
        TypeBuilder::new("System.Windows.Forms", "Form")
            .public()
            .extends(base),
    )?;

    Ok(Arc::new(
        StaticResolver::new()
            .with_module(Arc::new(mscorlib.build()))
            .with_module(Arc::new(drawing.build()))
            .with_module(Arc::new(forms.build())),
    ))
}

fn test_module() -> Result<ModuleDefinition> {
    let mut builder = ModuleBuilder::new(NAMESPACE);
    let mscorlib = builder.assembly_ref("mscorlib", v4());
    let drawing = builder.assembly_ref("System.Drawing", v4());
    let forms = builder.assembly_ref("System.Windows.Forms", v4());

    let object = builder.type_ref(mscorlib, "System", "Object");
    let attribute = builder.type_ref(mscorlib, "System", "Attribute");
    let list = builder.type_ref(mscorlib, "System.Collections.Generic", "List`1");
    let image = builder.type_ref(drawing, "System.Drawing", "Image");
    let form = builder.type_ref(forms, "System.Windows.Forms", "Form");

    let custom_attribute = builder.add_type(
        TypeBuilder::new(NAMESPACE, "CustomAttribute")
            .public()
            .extends(attribute)
            .method(Method::constructor(vec![])),
    )?;
    let ctor = builder
        .method_token(custom_attribute, ".ctor")
        .expect("attribute constructor");

    let interface =
        builder.add_type(TypeBuilder::new(NAMESPACE, "IInterface").public().interface())?;
    let empty =
        builder.add_type(TypeBuilder::new(NAMESPACE, "EmptyClass").public().extends(object))?;
    let empty2 =
        builder.add_type(TypeBuilder::new(NAMESPACE, "EmptyClass2").public().extends(object))?;

    builder.add_type(
        TypeBuilder::new(NAMESPACE, "RegularClass")
            .public()
            .extends(object)
            .implements(interface)
            .attribute(CustomAttribute::new(ctor))
            .field(Field::new("empty", TypeSignature::Class(empty)))
            .method(Method::new(
                "CreateEmpty",
                MethodSignature::instance(TypeSignature::Class(empty2), vec![]),
            )),
    )?;

    builder.add_type(
        TypeBuilder::new(NAMESPACE, "Form1")
            .public()
            .extends(form)
            .field(Field::new("background", TypeSignature::Class(image))),
    )?;

    let with_nested = builder.add_type(
        TypeBuilder::new(NAMESPACE, "ClassWithNestedClass")
            .public()
            .extends(object),
    )?;
    let nested = builder.add_nested_type(
        with_nested,
        TypeBuilder::nested("NestedClass").nested_public().extends(object),
    )?;
    builder.add_field(with_nested, Field::new("nested", TypeSignature::Class(nested)))?;

    let with_nested2 = builder.add_type(
        TypeBuilder::new(NAMESPACE, "ClassWithNestedClass2")
            .public()
            .extends(object),
    )?;
    builder.add_nested_type(
        with_nested2,
        TypeBuilder::nested("NestedClass").nested_public().extends(object),
    )?;

    builder.add_type(
        TypeBuilder::new(NAMESPACE, "ClassWithGeneric")
            .public()
            .extends(object)
            .generic_param(GenericParam::new(0, "T").constraint(empty))
            .attribute(CustomAttribute::new(ctor))
            .field(Field::new(
                "items",
                TypeSignature::GenericInst(
                    Box::new(TypeSignature::Class(list)),
                    vec![TypeSignature::Class(empty2)],
                ),
            )),
    )?;

    builder.add_type(TypeBuilder::new(NAMESPACE, "UnusedPrivateClass").extends(object))?;
    builder.add_resource(Resource::new(
        "ILStripTest.Form1.resources",
        vec![0xCE, 0xCA, 0xEF, 0xBE],
    ));

    Ok(builder.build())
}

fn stripper(entry_points: &[&str]) -> Result<Stripper> {
    init_logging();
    Ok(Stripper::new(test_module()?)
        .with_resolver(framework()?)
        .with_entry_points(entry_points.iter().copied()))
}

fn find(module: &ModuleDefinition, name: &str) -> Result<Option<Token>> {
    Ok(module.find_type(&name.parse()?))
}

fn assert_class(module: &ModuleDefinition, name: &str) -> Result<()> {
    assert!(find(module, name)?.is_some(), "{name} should exist");
    Ok(())
}

fn assert_no_class(module: &ModuleDefinition, name: &str) -> Result<()> {
    assert!(find(module, name)?.is_none(), "{name} should be removed");
    Ok(())
}

fn assert_class_public(module: &ModuleDefinition, name: &str, public: bool) -> Result<()> {
    let token = find(module, name)?.unwrap_or_else(|| panic!("{name} should exist"));
    let def = module.type_def(token).expect("type definition");
    assert_eq!(def.is_public(), public, "visibility of {name}");
    Ok(())
}

fn has_resource(module: &ModuleDefinition, name: &str) -> bool {
    module.resources().iter().any(|resource| resource.name == name)
}

fn has_reference(module: &ModuleDefinition, name: &str) -> bool {
    module.assembly_ref_by_name(name).is_some()
}

#[test]
fn scan_without_cleanup_changes_nothing() -> Result<()> {
    let mut stripper = stripper(&[])?;
    stripper.scan_used_classes()?;
    stripper.scan_unused_classes()?;

    let module = stripper.module();
    for name in [
        "ILStripTest.RegularClass",
        "ILStripTest.EmptyClass",
        "ILStripTest.EmptyClass2",
        "ILStripTest.Form1",
        "ILStripTest.ClassWithNestedClass",
        "ILStripTest.ClassWithNestedClass/NestedClass",
        "ILStripTest.ClassWithNestedClass2/NestedClass",
        "ILStripTest.CustomAttribute",
        "ILStripTest.ClassWithGeneric",
        "ILStripTest.IInterface",
    ] {
        assert_class_public(module, name, true)?;
    }
    assert!(has_resource(module, "ILStripTest.Form1.resources"));
    assert!(has_reference(module, "mscorlib"));
    assert!(has_reference(module, "System.Drawing"));
    assert!(has_reference(module, "System.Windows.Forms"));
    Ok(())
}

#[test]
fn cleanup_without_entry_points_removes_every_class() -> Result<()> {
    let mut stripper = stripper(&[])?;
    stripper.scan_used_classes()?;
    stripper.scan_unused_classes()?;
    let stats = stripper.cleanup_unused_classes()?;

    assert_eq!(stats.types_removed, 12);
    let module = stripper.module();
    for name in [
        "ILStripTest.RegularClass",
        "ILStripTest.EmptyClass",
        "ILStripTest.EmptyClass2",
        "ILStripTest.Form1",
        "ILStripTest.ClassWithNestedClass",
        "ILStripTest.ClassWithNestedClass/NestedClass",
        "ILStripTest.ClassWithNestedClass2",
        "ILStripTest.ClassWithNestedClass2/NestedClass",
        "ILStripTest.CustomAttribute",
        "ILStripTest.ClassWithGeneric",
        "ILStripTest.IInterface",
        "ILStripTest.UnusedPrivateClass",
    ] {
        assert_no_class(module, name)?;
    }
    assert_eq!(module.type_count(), 1);
    assert!(has_resource(module, "ILStripTest.Form1.resources"));
    assert!(has_reference(module, "System.Drawing"));
    assert!(has_reference(module, "System.Windows.Forms"));
    Ok(())
}

#[test]
fn cleanup_resources_keeps_classes() -> Result<()> {
    let mut stripper = stripper(&[])?;
    stripper.scan_used_classes()?;
    stripper.scan_unused_classes()?;
    let stats = stripper.cleanup_unused_resources()?;

    assert_eq!(stats.resources_removed, 1);
    let module = stripper.module();
    assert_class_public(module, "ILStripTest.Form1", true)?;
    assert_class_public(module, "ILStripTest.ClassWithNestedClass2", true)?;
    assert!(!has_resource(module, "ILStripTest.Form1.resources"));
    assert!(has_reference(module, "System.Drawing"));
    Ok(())
}

#[test]
fn cleanup_references_after_classes() -> Result<()> {
    let mut stripper = stripper(&[])?;
    stripper.scan_used_classes()?;
    stripper.scan_unused_classes()?;
    stripper.cleanup_unused_classes()?;
    let stats = stripper.cleanup_unused_references()?;

    assert_eq!(stats.references_removed, 2);
    let module = stripper.module();
    assert!(has_resource(module, "ILStripTest.Form1.resources"));
    assert!(has_reference(module, "mscorlib"));
    assert!(!has_reference(module, "System.Drawing"));
    assert!(!has_reference(module, "System.Windows.Forms"));
    assert!(module
        .type_refs()
        .all(|type_ref| type_ref.namespace.starts_with("System") && type_ref.name != "Form"));
    assert_eq!(module.type_refs().count(), 3);
    Ok(())
}

#[test]
fn cleanup_references_before_classes_keeps_them() -> Result<()> {
    let mut stripper = stripper(&[])?;
    let stats = stripper.cleanup_unused_references()?;

    assert!(!stats.has_changes());
    assert!(has_reference(stripper.module(), "System.Windows.Forms"));
    Ok(())
}

#[test]
fn entry_point_keeps_its_dependencies() -> Result<()> {
    let mut stripper = stripper(&["ILStripTest.RegularClass"])?;
    stripper.scan_used_classes()?;
    stripper.scan_unused_classes()?;
    stripper.cleanup_unused_classes()?;
    stripper.cleanup_unused_resources()?;
    stripper.cleanup_unused_references()?;

    let module = stripper.module();
    for name in [
        "ILStripTest.RegularClass",
        "ILStripTest.EmptyClass",
        "ILStripTest.EmptyClass2",
        "ILStripTest.CustomAttribute",
        "ILStripTest.IInterface",
    ] {
        assert_class_public(module, name, true)?;
    }
    for name in [
        "ILStripTest.Form1",
        "ILStripTest.ClassWithNestedClass",
        "ILStripTest.ClassWithNestedClass2",
        "ILStripTest.ClassWithGeneric",
    ] {
        assert_no_class(module, name)?;
    }
    assert!(!has_resource(module, "ILStripTest.Form1.resources"));
    assert!(has_reference(module, "mscorlib"));
    assert!(!has_reference(module, "System.Drawing"));
    assert!(!has_reference(module, "System.Windows.Forms"));
    Ok(())
}

#[test]
fn make_not_public_respects_exclusions() -> Result<()> {
    let mut stripper = stripper(&[
        "ILStripTest.Form1",
        "ILStripTest.RegularClass",
        "ILStripTest.ClassWithNestedClass",
    ])?;
    stripper
        .add_exclusion("ILStripTest.EmptyClass")
        .add_exclusion("ILStripTest.ClassWithNestedClass");

    stripper.scan_used_classes()?;
    stripper.scan_unused_classes()?;
    stripper.cleanup_unused_classes()?;
    stripper.cleanup_unused_resources()?;
    stripper.cleanup_unused_references()?;
    let demoted = stripper.make_not_public()?;

    // RegularClass, EmptyClass2, Form1, CustomAttribute, IInterface and the nested class
    assert_eq!(demoted, 6);
    let module = stripper.module();
    assert_class_public(module, "ILStripTest.RegularClass", false)?;
    assert_class_public(module, "ILStripTest.EmptyClass", true)?;
    assert_class_public(module, "ILStripTest.EmptyClass2", false)?;
    assert_class_public(module, "ILStripTest.Form1", false)?;
    assert_class_public(module, "ILStripTest.ClassWithNestedClass", true)?;
    assert_class_public(module, "ILStripTest.ClassWithNestedClass/NestedClass", false)?;
    assert_class_public(module, "ILStripTest.CustomAttribute", false)?;
    assert_class_public(module, "ILStripTest.IInterface", false)?;

    let nested = find(module, "ILStripTest.ClassWithNestedClass/NestedClass")?.expect("nested");
    assert_eq!(
        module.type_def(nested).expect("nested definition").visibility(),
        TypeVisibility::NestedAssembly
    );

    assert!(has_resource(module, "ILStripTest.Form1.resources"));
    assert!(has_reference(module, "mscorlib"));
    assert!(has_reference(module, "System.Drawing"));
    assert!(has_reference(module, "System.Windows.Forms"));
    Ok(())
}

#[test]
fn unknown_exclusion_is_rejected() -> Result<()> {
    let mut stripper = stripper(&[])?;
    stripper.add_exclusion("ILStripTest.DoesNotExist");

    assert!(matches!(stripper.make_not_public(), Err(Error::Configuration(_))));
    assert_class_public(stripper.module(), "ILStripTest.RegularClass", true)?;
    Ok(())
}

#[test]
fn nested_class_survives_only_when_referenced() -> Result<()> {
    let mut stripper = stripper(&[
        "ILStripTest.ClassWithNestedClass",
        "ILStripTest.ClassWithNestedClass2",
    ])?;
    stripper.scan_used_classes()?;
    stripper.scan_unused_classes()?;
    stripper.cleanup_unused_classes()?;

    let module = stripper.module();
    assert_class(module, "ILStripTest.ClassWithNestedClass")?;
    assert_class(module, "ILStripTest.ClassWithNestedClass/NestedClass")?;
    assert_class(module, "ILStripTest.ClassWithNestedClass2")?;
    assert_no_class(module, "ILStripTest.ClassWithNestedClass2/NestedClass")?;
    for name in [
        "ILStripTest.RegularClass",
        "ILStripTest.EmptyClass",
        "ILStripTest.EmptyClass2",
        "ILStripTest.Form1",
        "ILStripTest.ClassWithGeneric",
        "ILStripTest.IInterface",
        "ILStripTest.CustomAttribute",
    ] {
        assert_no_class(module, name)?;
    }
    assert!(has_resource(module, "ILStripTest.Form1.resources"));
    Ok(())
}

#[test]
fn nested_entry_point_keeps_enclosing_class() -> Result<()> {
    let mut stripper = stripper(&["ILStripTest.ClassWithNestedClass2/NestedClass"])?;
    stripper.scan_used_classes()?;
    stripper.scan_unused_classes()?;
    stripper.cleanup_unused_classes()?;

    let module = stripper.module();
    assert_class(module, "ILStripTest.ClassWithNestedClass2")?;
    assert_class(module, "ILStripTest.ClassWithNestedClass2/NestedClass")?;
    assert_no_class(module, "ILStripTest.ClassWithNestedClass")?;
    assert_no_class(module, "ILStripTest.ClassWithNestedClass/NestedClass")?;
    assert_no_class(module, "ILStripTest.RegularClass")?;
    Ok(())
}

#[test]
fn generic_constraints_and_arguments_are_followed() -> Result<()> {
    let mut stripper = stripper(&["ILStripTest.ClassWithGeneric"])?;
    stripper.scan_used_classes()?;
    stripper.scan_unused_classes()?;
    stripper.cleanup_unused_classes()?;

    let module = stripper.module();
    assert_class(module, "ILStripTest.ClassWithGeneric")?;
    assert_class(module, "ILStripTest.EmptyClass")?;
    assert_class(module, "ILStripTest.EmptyClass2")?;
    assert_class(module, "ILStripTest.CustomAttribute")?;
    assert_no_class(module, "ILStripTest.RegularClass")?;
    assert_no_class(module, "ILStripTest.Form1")?;
    assert_no_class(module, "ILStripTest.ClassWithNestedClass")?;
    assert_no_class(module, "ILStripTest.ClassWithNestedClass2/NestedClass")?;
    Ok(())
}

#[test]
fn foreign_hierarchy_is_tracked() -> Result<()> {
    let mut stripper = stripper(&["ILStripTest.Form1"])?;
    let used = stripper.scan_used_classes()?;

    // Form and Image, plus the Object both derive from
    assert_eq!(used.foreign_nodes().count(), 3);
    assert_eq!(used.stats().modules_resolved, 3);
    assert_eq!(used.stats().unresolved_edges, 0);
    Ok(())
}

#[test]
fn unknown_entry_point_is_rejected() -> Result<()> {
    let mut stripper = stripper(&["ILStripTest.Missing", "ILStripTest.RegularClass"])?;
    match stripper.scan_used_classes() {
        Err(Error::Configuration(message)) => assert!(message.contains("ILStripTest.Missing")),
        other => panic!("expected a configuration error, got {:?}", other.map(|_| ())),
    }
    assert!(stripper.used().is_none());
    Ok(())
}

#[test]
fn run_all_reaches_fixed_point() -> Result<()> {
    let mut stripper = stripper(&["ILStripTest.RegularClass"])?.with_demotion(true);
    let stats = stripper.run_all()?;

    assert_eq!(stats.types_removed, 7);
    assert_eq!(stats.resources_removed, 1);
    assert_eq!(stats.references_removed, 2);
    assert_eq!(stats.types_demoted, 5);

    let again = stripper.run_all()?;
    assert!(!again.has_changes());
    Ok(())
}

#[test]
fn exclusion_of_removed_class_is_ignored_by_run_all() -> Result<()> {
    let mut stripper = stripper(&["ILStripTest.RegularClass"])?
        .with_exclusions(["ILStripTest.Form1", "ILStripTest.EmptyClass"])
        .with_demotion(true);
    let stats = stripper.run_all()?;

    assert_eq!(stats.types_removed, 7);
    assert_eq!(stats.types_demoted, 4);
    let module = stripper.module();
    assert_no_class(module, "ILStripTest.Form1")?;
    assert_class_public(module, "ILStripTest.EmptyClass", true)?;
    assert_class_public(module, "ILStripTest.RegularClass", false)?;

    // removed exclusions stay ignored once the scan results are gone
    stripper.add_entry_point("ILStripTest.EmptyClass2");
    stripper.scan_used_classes()?;
    assert_eq!(stripper.make_not_public()?, 0);
    Ok(())
}

#[test]
fn unknown_exclusion_fails_run_all_before_any_change() -> Result<()> {
    let mut stripper = stripper(&["ILStripTest.RegularClass"])?
        .with_exclusions(["ILStripTest.Missing", "ILStripTest.EmptyClass"])
        .with_demotion(true);

    match stripper.run_all() {
        Err(Error::Configuration(message)) => {
            assert!(message.contains("ILStripTest.Missing"));
            assert!(!message.contains("ILStripTest.EmptyClass"));
        }
        other => panic!("expected a configuration error, got {other:?}"),
    }

    let module = stripper.module();
    assert_eq!(module.type_count(), 13);
    assert_class_public(module, "ILStripTest.Form1", true)?;
    assert!(has_resource(module, "ILStripTest.Form1.resources"));
    assert!(has_reference(module, "System.Windows.Forms"));
    Ok(())
}

#[test]
fn used_set_is_closed_under_outgoing_edges() -> Result<()> {
    let entry_sets: [&[&str]; 5] = [
        &[],
        &["ILStripTest.RegularClass"],
        &["ILStripTest.Form1", "ILStripTest.ClassWithGeneric"],
        &["ILStripTest.ClassWithNestedClass/NestedClass"],
        &["ILStripTest.ClassWithNestedClass", "ILStripTest.ClassWithNestedClass2"],
    ];

    for entry_points in entry_sets {
        let mut stripper = stripper(entry_points)?;
        stripper.scan_used_classes()?;
        let used = stripper.used().expect("scan result");
        let module = stripper.module();

        for token in used.local_tokens() {
            for edge in ilstrip::strip::outgoing_edges(module, token)? {
                let target = match edge.target {
                    EdgeTarget::Token(target) if target.is_table(TableId::TypeDef) => Some(target),
                    EdgeTarget::Token(_) => None,
                    EdgeTarget::Named { assembly, name } => match assembly {
                        Some(assembly) if assembly != NAMESPACE => None,
                        _ => module.find_type(&name),
                    },
                };
                if let Some(target) = target {
                    assert!(
                        used.contains_local(target),
                        "{entry_points:?}: {token} has a {:?} edge to unused {target}",
                        edge.kind
                    );
                }
            }
        }
    }
    Ok(())
}
