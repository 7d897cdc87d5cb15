// Integration tests over the sample translation units in fixtures/

use outliner::{
    Access, CParser, CppParser, DirectiveKind, LanguageParser, MethodKind, RecordKind,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

#[test]
fn test_sample_c_functions() {
    let parser = CParser::new();
    let unit = parser
        .parse_file(Path::new("fixtures/sample.c"))
        .expect("Parsing failed");

    let declared = [
        "print_hello",
        "add_numbers",
        "process_array",
        "handle_pointers",
        "use_control_flow",
        "demonstrate_memory_allocation",
    ];

    // Each declared function appears twice: once as a prototype, once as a
    // definition.
    for name in declared {
        let prototypes = unit
            .functions
            .iter()
            .filter(|f| f.name == name && !f.has_body)
            .count();
        let definitions = unit
            .functions
            .iter()
            .filter(|f| f.name == name && f.has_body)
            .count();
        assert_eq!(prototypes, 1, "expected one prototype for {}", name);
        assert_eq!(definitions, 1, "expected one definition for {}", name);
    }

    let main = unit
        .functions
        .iter()
        .find(|f| f.name == "main")
        .expect("main not found");
    assert!(main.has_body);
    assert_eq!(main.signature.params.len(), 0);
    assert_eq!(main.signature.return_type.as_ref().unwrap().name, "int");
}

#[test]
fn test_sample_c_directives() {
    let parser = CParser::new();
    let unit = parser.parse_file(Path::new("fixtures/sample.c")).unwrap();

    let includes: Vec<_> = unit
        .directives
        .iter()
        .filter(|d| d.kind == DirectiveKind::Include)
        .map(|d| d.text.as_str())
        .collect();
    assert_eq!(
        includes,
        vec![
            "#include <stdio.h>",
            "#include <stdlib.h>",
            "#include <string.h>"
        ]
    );

    let defines: Vec<_> = unit
        .directives
        .iter()
        .filter(|d| d.kind == DirectiveKind::Define)
        .map(|d| d.text.as_str())
        .collect();
    assert_eq!(defines.len(), 2);
    assert!(defines[0].contains("MAX_SIZE 100"));
    assert!(defines[1].contains("MIN(a, b)"));
}

#[test]
fn test_sample_c_typedefs() {
    let parser = CParser::new();
    let unit = parser.parse_file(Path::new("fixtures/sample.c")).unwrap();

    let point = unit.record("Point").expect("Point not found");
    assert_eq!(point.kind, RecordKind::Struct);
    let fields: Vec<_> = point.fields().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["x", "y"]);

    let color = unit.enumeration("Color").expect("Color not found");
    let enumerators: Vec<_> = color
        .enumerators
        .iter()
        .map(|e| (e.name.as_str(), e.value))
        .collect();
    assert_eq!(
        enumerators,
        vec![("RED", Some(0)), ("GREEN", Some(1)), ("BLUE", Some(2))]
    );
}

#[test]
fn test_sample_c_pointer_parameters() {
    let parser = CParser::new();
    let unit = parser.parse_file(Path::new("fixtures/sample.c")).unwrap();

    let process = unit
        .functions
        .iter()
        .find(|f| f.name == "process_array" && f.has_body)
        .unwrap();
    let arr = &process.signature.params[0];
    assert_eq!(arr.name.as_deref(), Some("arr"));
    assert_eq!(arr.ty.array_dims, vec![None]);
}

#[test]
fn test_sample_cpp_extends_sample_c() {
    // The C++ sample is the C sample plus an appended C++-specific section.
    let c_text = fs::read_to_string("fixtures/sample.c").unwrap();
    let cpp_text = fs::read_to_string("fixtures/sample.cpp").unwrap();
    assert!(cpp_text.starts_with(&c_text));
}

#[test]
fn test_sample_cpp_classes() {
    let parser = CppParser::new();
    let unit = parser.parse_file(Path::new("fixtures/sample.cpp")).unwrap();

    let shape = unit.record("Shape").expect("Shape not found");
    assert_eq!(shape.kind, RecordKind::Class);
    let area = shape.methods().find(|m| m.name == "area").unwrap();
    assert!(area.is_virtual);
    assert!(area.is_pure);
    assert!(area.is_const);
    assert!(!area.has_body);
    let dtor = shape.methods().find(|m| m.name == "~Shape").unwrap();
    assert_eq!(dtor.kind, MethodKind::Destructor);
    assert!(dtor.is_virtual);
    assert!(dtor.has_body);

    for name in ["Circle", "Rectangle"] {
        let class = unit.record(name).unwrap_or_else(|| panic!("{} not found", name));
        assert_eq!(class.bases.as_deref(), Some("public Shape"));
        let area = class.methods().find(|m| m.name == "area").unwrap();
        assert!(area.is_override);
        assert!(area.is_const);
        assert!(area.has_body);
        assert_eq!(area.access, Access::Public);
        let ctor = class
            .methods()
            .find(|m| m.kind == MethodKind::Constructor)
            .unwrap();
        assert_eq!(ctor.name, name);
    }

    let rectangle = unit.record("Rectangle").unwrap();
    let fields: Vec<_> = rectangle.fields().collect();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name, "width");
    assert_eq!(fields[1].name, "height");
    assert!(fields.iter().all(|f| f.access == Access::Private));
}

#[test]
fn test_sample_cpp_template_function() {
    let parser = CppParser::new();
    let unit = parser.parse_file(Path::new("fixtures/sample.cpp")).unwrap();

    let max = unit
        .functions
        .iter()
        .find(|f| f.name == "max")
        .expect("max not found");
    assert!(max.template.as_ref().unwrap().contains("typename T"));
    assert!(max.has_body);
    assert_eq!(max.signature.return_type.as_ref().unwrap().name, "T");
    assert_eq!(max.signature.params.len(), 2);
    assert!(max.body.as_ref().unwrap().contains("(a > b) ? a : b"));
}

#[test]
fn test_sample_cpp_keeps_c_declarations() {
    let parser = CppParser::new();
    let unit = parser.parse_file(Path::new("fixtures/sample.cpp")).unwrap();

    assert!(unit.record("Point").is_some());
    assert!(unit.enumeration("Color").is_some());
    assert!(unit.functions.iter().any(|f| f.name == "main"));
    assert!(unit
        .functions
        .iter()
        .any(|f| f.name == "demonstrate_cpp_features"));
}

#[test]
fn test_fields_fixture_access_regions() {
    let parser = CppParser::new();
    let unit = parser
        .parse_file(Path::new("fixtures/sample_with_fields.cpp"))
        .unwrap();

    let my_class = unit.record("MyClass").expect("MyClass not found");
    assert_eq!(my_class.kind, RecordKind::Class);

    // Exactly one field per access region, in declaration order.
    let fields: Vec<_> = my_class
        .fields()
        .map(|f| (f.name.as_str(), f.access))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("public_data", Access::Public),
            ("protected_flag", Access::Protected),
            ("private_name", Access::Private),
        ]
    );

    let public_data = my_class.fields().next().unwrap();
    assert_eq!(public_data.ty.name, "int");
    assert!(public_data
        .doc
        .as_ref()
        .unwrap()
        .contains("Public integer data."));

    let private_name = my_class.fields().last().unwrap();
    assert_eq!(private_name.ty.name, "std::string");
    assert!(private_name
        .doc
        .as_ref()
        .unwrap()
        .contains("Private string name."));

    let ctor = my_class
        .methods()
        .find(|m| m.kind == MethodKind::Constructor)
        .unwrap();
    assert_eq!(ctor.access, Access::Public);
    assert!(ctor.has_body);

    let public_method = my_class
        .methods()
        .find(|m| m.name == "public_method")
        .unwrap();
    assert_eq!(public_method.access, Access::Public);
    let private_method = my_class
        .methods()
        .find(|m| m.name == "private_method")
        .unwrap();
    assert_eq!(private_method.access, Access::Private);
}

#[test]
fn test_fields_fixture_struct_defaults_public() {
    let parser = CppParser::new();
    let unit = parser
        .parse_file(Path::new("fixtures/sample_with_fields.cpp"))
        .unwrap();

    let my_struct = unit.record("MyStruct").expect("MyStruct not found");
    assert_eq!(my_struct.kind, RecordKind::Struct);
    let fields: Vec<_> = my_struct.fields().collect();
    assert_eq!(fields.len(), 2);
    assert!(fields.iter().all(|f| f.access == Access::Public));
    assert!(fields.iter().all(|f| f.ty.name == "double"));
}
