use oap_core::model::DataType;
use oap_core::{resolve_api, ApiOptions, AppError, Mapping};
use pretty_assertions::assert_eq;

const PETSTORE: &str = r##"
openapi: 3.0.3
info:
  title: Pet Store
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
            format: int32
            maximum: 100
      responses:
        '200':
          description: pets
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/Pet'
  /pets/{petId}:
    get:
      operationId: showPet
      parameters:
        - name: petId
          in: path
          required: true
          schema:
            type: string
            format: uuid
      responses:
        '200':
          description: pet
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
components:
  schemas:
    Foo:
      type: object
      properties:
        foo: {type: string}
        foobar: {type: string}
    Bar:
      type: object
      properties:
        bar: {type: string}
        barfoo: {type: string}
    FooBar:
      allOf:
        - $ref: '#/components/schemas/Foo'
        - $ref: '#/components/schemas/Bar'
    Pet:
      type: object
      required: [id, name]
      properties:
        id: {type: integer, format: int64}
        name: {type: string}
        born: {type: string, format: date}
        tags:
          type: array
          items: {type: string}
        parent:
          $ref: '#/components/schemas/Pet'
    Ids:
      type: array
      items:
        type: integer
        format: int32
"##;

#[test]
fn test_all_of_properties_and_identity() {
    let mut options = ApiOptions::new();
    options.package_name = "pkg".to_string();
    options.model_name_suffix = "X".to_string();

    let api = resolve_api(PETSTORE, &options).unwrap();
    let id = api.model("FooBar").unwrap();
    let types = &api.types;

    let keys: Vec<String> = types.properties(id).keys().cloned().collect();
    assert_eq!(keys, vec!["foo", "foobar", "bar", "barfoo"]);
    assert_eq!(types.name(id), "FooBar");
    assert_eq!(types.type_name(id), "FooBarX");
    assert_eq!(types.package_name(id), "pkg.model");
    let imports: Vec<String> = types.imports(id).into_iter().collect();
    assert_eq!(imports, vec!["pkg.model.FooBarX".to_string()]);
}

#[test]
fn test_integer_array_name_and_package() {
    let api = resolve_api(PETSTORE, &ApiOptions::new()).unwrap();
    let id = api.model("Ids").unwrap();

    assert_eq!(api.types.name(id), "Integer[]");
    assert_eq!(api.types.package_name(id), "java.lang");
    let imports: Vec<String> = api.types.imports(id).into_iter().collect();
    assert_eq!(imports, vec!["java.lang.Integer".to_string()]);
}

#[test]
fn test_self_reference_points_at_same_type() {
    let api = resolve_api(PETSTORE, &ApiOptions::new()).unwrap();
    let pet = api.model("Pet").unwrap();

    assert_eq!(api.types.properties(pet).get("parent"), Some(pet));
    assert_eq!(api.types.required(pet), vec!["id".to_string(), "name".to_string()]);
    assert_eq!(
        api.types.properties(pet).keys().cloned().collect::<Vec<_>>(),
        vec!["id", "name", "born", "tags", "parent"]
    );
}

#[test]
fn test_shared_component_resolves_once() {
    let api = resolve_api(PETSTORE, &ApiOptions::new()).unwrap();
    let pet = api.model("Pet").unwrap();

    let show = api.endpoint("/pets/{petId}", "get").unwrap();
    assert_eq!(show.responses[0].contents[0].data_type, Some(pet));

    let list = api.endpoint("/pets", "get").unwrap();
    let pets = list.responses[0].contents[0].data_type.unwrap();
    assert!(matches!(api.types.get(pets), Some(DataType::Array { item, .. }) if *item == pet));
}

#[test]
fn test_end_to_end_mapping() {
    let mapping = Mapping::parse(
        r#"
openapi-processor-mapping: v2
options:
  package-name: io.openapiprocessor
  bean-validation: jakarta
map:
  types:
    - type: array => java.util.List
    - type: string:uuid => java.util.UUID
    - type: Pet @ io.openapiprocessor.Audited
  paths:
    /pets:
      parameters:
        - name: limit => java.lang.Long
"#,
    )
    .unwrap();
    let mut options = ApiOptions::new().with_mapping(mapping);
    options.apply_mapping_options();
    let api = resolve_api(PETSTORE, &options).unwrap();
    let types = &api.types;

    let pet = api.model("Pet").unwrap();
    assert_eq!(types.package_name(pet), "io.openapiprocessor.model");
    let tags = types.properties(pet).get("tags").unwrap();
    assert_eq!(types.name(tags), "List<String>");
    let rendered: Vec<String> = types.annotations(pet).iter().map(|a| a.render()).collect();
    assert_eq!(rendered, vec!["@Audited".to_string()]);

    let show = api.endpoint("/pets/{petId}", "get").unwrap();
    let pet_id = show.parameters[0].data_type;
    assert_eq!(types.name(pet_id), "UUID");
    assert!(types.imports(pet_id).contains("java.util.UUID"));

    let list = api.endpoint("/pets", "get").unwrap();
    let limit = list.parameters[0].data_type;
    assert_eq!(types.name(limit), "Long");
    let limit_annotations: Vec<String> =
        types.annotations(limit).iter().map(|a| a.render()).collect();
    assert_eq!(limit_annotations, vec!["@DecimalMax(\"100\")".to_string()]);

    let pets = list.responses[0].contents[0].data_type.unwrap();
    assert_eq!(types.name(pets), "List<Pet>");
}

#[test]
fn test_missing_items_reports_location() {
    let doc = r#"
openapi: 3.0.3
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    List:
      type: array
"#;
    let err = resolve_api(doc, &ApiOptions::new()).unwrap_err();
    assert!(matches!(err, AppError::InvalidItem { .. }));
    assert_eq!(err.location(), Some("#/components/schemas/List"));
}

#[test]
fn test_untyped_schema_is_unknown() {
    let doc = r#"
openapi: 3.0.3
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    Weird:
      description: no type at all
"#;
    let err = resolve_api(doc, &ApiOptions::new()).unwrap_err();
    match err {
        AppError::UnknownSchemaType {
            schema_type,
            location,
        } => {
            assert_eq!(schema_type, "<none>");
            assert_eq!(location, "#/components/schemas/Weird");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_openapi_31_document() {
    let doc = r##"
openapi: 3.1.0
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    User:
      type: object
      properties:
        id: {type: integer, format: int64}
        nickname:
          type: [string, "null"]
        group:
          $ref: '#/components/schemas/Group'
    Group:
      type: object
      properties:
        title: {type: string}
"##;
    let api = resolve_api(doc, &ApiOptions::new()).unwrap();
    let user = api.model("User").unwrap();
    let group = api.model("Group").unwrap();
    let props = api.types.properties(user);

    assert_eq!(props.get("group"), Some(group));
    assert_eq!(api.types.name(props.get("id").unwrap()), "Long");
    let nickname = props.get("nickname").unwrap();
    assert_eq!(api.types.name(nickname), "String");
    assert!(api.types.get(nickname).unwrap().constraints().unwrap().nullable);
}

const SCOPED: &str = r##"
openapi: 3.0.3
info: {title: T, version: '1'}
paths:
  /pets:
    get:
      operationId: findPets
      parameters:
        - name: day
          in: query
          schema: {$ref: '#/components/schemas/Day'}
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Pet'}
components:
  schemas:
    Day: {type: string, format: date}
    Pet:
      type: object
      properties:
        born: {type: string, format: date}
        day: {$ref: '#/components/schemas/Day'}
"##;

#[test]
fn test_parameter_type_rule_applies_to_referenced_schema() {
    let mapping = Mapping::parse(
        r#"
openapi-processor-mapping: v2
map:
  parameters:
    - type: string:date => java.time.ZonedDateTime
"#,
    )
    .unwrap();
    let api = resolve_api(SCOPED, &ApiOptions::new().with_mapping(mapping)).unwrap();
    let types = &api.types;

    let find = api.endpoint("/pets", "get").unwrap();
    assert_eq!(types.name(find.parameters[0].data_type), "ZonedDateTime");

    let day = api.model("Day").unwrap();
    assert_eq!(types.name(day), "LocalDate");
    let pet = api.model("Pet").unwrap();
    assert_eq!(types.properties(pet).get("day"), Some(day));
}

#[test]
fn test_response_type_rule_applies_to_referenced_model() {
    let mapping = Mapping::parse(
        r#"
openapi-processor-mapping: v2
map:
  responses:
    - type: Pet => io.ExternalPet
"#,
    )
    .unwrap();
    let api = resolve_api(SCOPED, &ApiOptions::new().with_mapping(mapping)).unwrap();
    let types = &api.types;

    let find = api.endpoint("/pets", "get").unwrap();
    let response = find.responses[0].contents[0].data_type.unwrap();
    assert_eq!(types.name(response), "ExternalPet");
    assert_eq!(types.package_name(response), "io");
    assert_eq!(types.name(api.model("Pet").unwrap()), "Pet");
}

#[test]
fn test_parameter_annotation_stays_on_the_parameter() {
    let mapping = Mapping::parse(
        r#"
openapi-processor-mapping: v2
map:
  parameters:
    - type: string:date @ io.ParamOnly
"#,
    )
    .unwrap();
    let api = resolve_api(SCOPED, &ApiOptions::new().with_mapping(mapping)).unwrap();
    let types = &api.types;

    let find = api.endpoint("/pets", "get").unwrap();
    let day = &find.parameters[0];
    assert_eq!(day.annotations, vec![oap_core::Annotation::new("io.ParamOnly")]);
    assert!(types.annotations(day.data_type).is_empty());

    let pet = api.model("Pet").unwrap();
    let born = types.properties(pet).get("born").unwrap();
    assert!(types.annotations(born).is_empty());

    let report = api.report();
    let param = &report.endpoints[0].parameters[0];
    assert_eq!(param.reference.annotations, vec!["@ParamOnly".to_string()]);
    assert!(param.reference.imports.contains(&"io.ParamOnly".to_string()));
    assert!(report.model("Pet").unwrap().reference.annotations.is_empty());
}

#[test]
fn test_type_rule_by_name_ignores_inline_names() {
    let mapping = Mapping::parse(
        r#"
openapi-processor-mapping: v2
map:
  types:
    - type: PetBorn => io.Wrong
    - type: Day => io.Day
"#,
    )
    .unwrap();
    let api = resolve_api(SCOPED, &ApiOptions::new().with_mapping(mapping)).unwrap();
    let types = &api.types;

    let pet = api.model("Pet").unwrap();
    let props = types.properties(pet);
    assert_eq!(types.name(props.get("born").unwrap()), "LocalDate");
    assert_eq!(types.name(props.get("day").unwrap()), "Day");
    assert_eq!(types.package_name(props.get("day").unwrap()), "io");
}

#[test]
fn test_mutually_recursive_components() {
    let doc = r##"
openapi: 3.0.3
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    Author:
      type: object
      properties:
        books:
          type: array
          items: {$ref: '#/components/schemas/Book'}
    Book:
      type: object
      properties:
        author: {$ref: '#/components/schemas/Author'}
"##;
    let api = resolve_api(doc, &ApiOptions::new()).unwrap();
    let author = api.model("Author").unwrap();
    let book = api.model("Book").unwrap();

    assert_eq!(api.types.properties(book).get("author"), Some(author));
    let books = api.types.properties(author).get("books").unwrap();
    assert!(matches!(api.types.get(books), Some(DataType::Array { item, .. }) if *item == book));
    assert_eq!(api.types.name(books), "Book[]");
}

#[test]
fn test_all_of_collision_keeps_first_position_last_value() {
    let doc = r##"
openapi: 3.0.3
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    Base:
      type: object
      properties:
        id: {type: string}
        kind: {type: string}
    Extended:
      allOf:
        - $ref: '#/components/schemas/Base'
        - type: object
          properties:
            id: {type: integer, format: int64}
            extra: {type: boolean}
"##;
    let api = resolve_api(doc, &ApiOptions::new()).unwrap();
    let extended = api.model("Extended").unwrap();
    let props = api.types.properties(extended);

    let keys: Vec<String> = props.keys().cloned().collect();
    assert_eq!(keys, vec!["id", "kind", "extra"]);
    assert_eq!(api.types.name(props.get("id").unwrap()), "Long");
}

#[test]
fn test_reference_cycle_fails() {
    let doc = r##"
openapi: 3.0.3
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    A: {$ref: '#/components/schemas/B'}
    B: {$ref: '#/components/schemas/A'}
"##;
    let err = resolve_api(doc, &ApiOptions::new()).unwrap_err();
    assert!(matches!(err, AppError::CyclicReference { .. }));
    assert_eq!(err.location(), Some("#/components/schemas/A"));

    let own = r##"
openapi: 3.0.3
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    Me: {$ref: '#/components/schemas/Me'}
"##;
    let err = resolve_api(own, &ApiOptions::new()).unwrap_err();
    assert!(matches!(err, AppError::CyclicReference { .. }));
}

#[test]
fn test_unresolvable_response_reference_fails_the_run() {
    let doc = r##"
openapi: 3.0.3
info: {title: T, version: '1'}
paths:
  /a:
    get:
      responses:
        '200': {$ref: '#/components/responses/Missing'}
"##;
    let err = resolve_api(doc, &ApiOptions::new()).unwrap_err();
    assert!(matches!(err, AppError::UnresolvableReference { .. }));
    assert_eq!(err.location(), Some("#/paths/~1a/get/responses/200"));
}

#[test]
fn test_collection_names_use_schema_names_with_suffix() {
    let mut options = ApiOptions::new();
    options.model_name_suffix = "Resource".to_string();
    let api = resolve_api(PETSTORE, &options).unwrap();

    let list = api.endpoint("/pets", "get").unwrap();
    let pets = list.responses[0].contents[0].data_type.unwrap();
    assert_eq!(api.types.name(pets), "Pet[]");
    assert_eq!(api.types.type_name(pets), "PetResource[]");
}

#[test]
fn test_openapi_31_component_order() {
    let doc = r##"
openapi: 3.1.0
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    Zoo: {type: object, properties: {name: {type: string}}}
    Animal: {type: object, properties: {name: {type: string}}}
"##;
    let api = resolve_api(doc, &ApiOptions::new()).unwrap();
    let names: Vec<&str> = api.models.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Zoo", "Animal"]);
}
