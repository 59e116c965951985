//! Integration tests for the OpenAPI -> IR direction.

use openapi_ir::diagnostic::{OPERATION_FAILED, PATCH_SKIPPED, REFERENCE_SKIPPED};
use openapi_ir::{
    convert_paths, convert_type, import_document, load_document_str, ConvertError, HttpMethod,
    ImportOptions, PrimitiveType, TypeReference, TypeShape,
};
use serde_json::{json, Value};

fn object_fields(shape: &TypeShape) -> Vec<(&str, String)> {
    let TypeShape::Object { properties, .. } = shape else {
        panic!("expected object, got {:?}", shape);
    };
    properties
        .iter()
        .map(|p| (p.key.as_str(), p.value_type.to_string()))
        .collect()
}

fn post_response() -> Value {
    json!({
        "description": "OK",
        "content": {
            "application/json": { "schema": { "$ref": "#/components/schemas/Post" } }
        }
    })
}

// === Type conversion ===

mod types {
    use super::*;

    #[test]
    fn nested_array_hoisting() {
        let schema = json!({
            "type": "object",
            "required": ["title", "comments"],
            "properties": {
                "title": { "type": "string" },
                "comments": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "author": { "$ref": "#/components/schemas/Author" },
                            "visibility": { "enum": ["public", "private"] }
                        }
                    }
                }
            }
        });

        let conversion = convert_type("Post", &schema).unwrap();
        let names: Vec<&str> = conversion
            .declarations
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Post", "PostCommentsItemVisibility", "PostCommentsItem"]
        );
        assert_eq!(
            object_fields(&conversion.declarations[0].shape),
            vec![
                ("title", "string".to_string()),
                ("comments", "list<PostCommentsItem>".to_string())
            ]
        );
        assert_eq!(
            object_fields(&conversion.declarations[2].shape),
            vec![
                ("author", "optional<Author>".to_string()),
                ("visibility", "optional<PostCommentsItemVisibility>".to_string())
            ]
        );
    }

    #[test]
    fn enum_filtering() {
        let conversion = convert_type("Letter", &json!({ "enum": ["a", 1, "b"] })).unwrap();
        assert_eq!(
            conversion.root().unwrap().shape,
            TypeShape::Enum {
                values: vec!["a".into(), "b".into()]
            }
        );
    }

    #[test]
    fn reference_passthrough() {
        let schema = json!({
            "type": "object",
            "properties": { "author": { "$ref": "#/components/schemas/Author" } }
        });
        let conversion = convert_type("Post", &schema).unwrap();
        assert!(conversion.hoisted().is_empty());
        assert_eq!(
            object_fields(&conversion.declarations[0].shape),
            vec![("author", "optional<Author>".to_string())]
        );
    }

    #[test]
    fn formats_select_primitives() {
        let schema = json!({
            "type": "object",
            "required": ["id", "views", "likes", "score", "published", "slug", "draft"],
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "views": { "type": "integer", "format": "int64" },
                "likes": { "type": "integer", "format": "int32" },
                "score": { "type": "number", "format": "float" },
                "published": { "type": "string", "format": "date-time" },
                "slug": { "type": "string", "format": "hostname" },
                "draft": { "type": "boolean" }
            }
        });
        let conversion = convert_type("Post", &schema).unwrap();
        let types: Vec<String> = object_fields(&conversion.declarations[0].shape)
            .into_iter()
            .map(|(_, t)| t)
            .collect();
        assert_eq!(
            types,
            vec!["uuid", "long", "integer", "double", "datetime", "string", "boolean"]
        );
    }

    #[test]
    fn map_of_references() {
        let schema = json!({
            "type": "object",
            "additionalProperties": { "$ref": "#/components/schemas/Post" }
        });
        let conversion = convert_type("PostsById", &schema).unwrap();
        assert_eq!(
            conversion.root().unwrap().shape,
            TypeShape::Alias {
                alias_of: TypeReference::map(
                    PrimitiveType::String.into(),
                    TypeReference::named("Post")
                )
            }
        );
    }
}

// === Service conversion ===

mod services {
    use super::*;

    #[test]
    fn endpoint_extraction() {
        let paths = json!({
            "/posts/{id}": {
                "get": {
                    "operationId": "getPost",
                    "parameters": [
                        { "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }
                    ],
                    "responses": { "200": post_response() }
                }
            }
        });

        let conversion = convert_paths("Blog", &paths).unwrap();
        assert!(conversion.diagnostics.is_empty());
        assert_eq!(conversion.service.endpoints.len(), 1);

        let endpoint = &conversion.service.endpoints["getPost"];
        assert_eq!(endpoint.method, HttpMethod::Get);
        assert_eq!(endpoint.path, "/posts/{id}");
        assert_eq!(endpoint.path_parameters.len(), 1);
        assert_eq!(endpoint.path_parameters["id"], PrimitiveType::Integer);
        assert_eq!(endpoint.response, Some(TypeReference::named("Post")));
        assert_eq!(endpoint.request, None);
    }

    #[test]
    fn missing_operation_id_fails() {
        let paths = json!({
            "/posts/{id}": {
                "get": { "responses": { "200": post_response() } }
            }
        });
        let result = convert_paths("Blog", &paths);
        assert!(matches!(
            result,
            Err(ConvertError::MissingOperationId { path, method })
                if path == "/posts/{id}" && method == "GET"
        ));
    }

    #[test]
    fn missing_operation_id_is_reported_not_generated() {
        let document = json!({
            "openapi": "3.0.3",
            "paths": {
                "/posts": {
                    "get": { "responses": { "200": post_response() } },
                    "post": {
                        "operationId": "createPost",
                        "requestBody": {
                            "content": {
                                "application/json": { "schema": { "$ref": "#/components/schemas/Post" } }
                            }
                        },
                        "responses": { "201": post_response() }
                    }
                }
            },
            "components": { "schemas": { "Post": { "type": "object" } } }
        });

        let result = import_document(&document, &ImportOptions::default());
        let ids: Vec<&String> = result.service.endpoints.keys().collect();
        assert_eq!(ids, vec!["createPost"]);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, OPERATION_FAILED);
        assert_eq!(result.diagnostics[0].path, "/paths/~1posts/get");
    }
}

// === Whole documents ===

mod documents {
    use super::*;

    const BLOG_YAML: &str = r##"
openapi: 3.0.3
info:
  title: Blog
  version: "1.0"
paths:
  /posts:
    post:
      operationId: createPost
      requestBody:
        content:
          application/json:
            schema:
              $ref: "#/components/schemas/CreatePost"
      responses:
        201:
          description: Created
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Post"
  /posts/{id}:
    parameters:
      - name: id
        in: path
        required: true
        schema:
          type: string
          format: uuid
    get:
      operationId: getPost
      summary: Fetch one post
      responses:
        200:
          description: OK
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Post"
    delete:
      operationId: deletePost
      responses:
        204:
          description: Deleted
    patch:
      operationId: patchPost
components:
  schemas:
    CreatePost:
      type: object
      required: [title]
      properties:
        title:
          type: string
        tags:
          type: array
          items:
            type: string
    Post:
      description: A published post
      allOf:
        - $ref: "#/components/schemas/CreatePost"
      required: [id]
      properties:
        id:
          type: string
          format: uuid
        status:
          enum: [draft, live, 3]
    PostRef:
      $ref: "#/components/schemas/Post"
"##;

    #[test]
    fn yaml_document_imports_end_to_end() {
        let document = load_document_str(BLOG_YAML).unwrap();
        let result = import_document(&document, &ImportOptions::new("Blog"));

        let names: Vec<&str> = result.types.names().collect();
        assert_eq!(names, vec!["CreatePost", "Post", "PostStatus"]);

        let post = result.types.get("Post").unwrap();
        assert_eq!(post.docs.as_deref(), Some("A published post"));
        let TypeShape::Object { extends, .. } = &post.shape else {
            panic!("expected object");
        };
        assert_eq!(extends, &vec!["CreatePost".to_string()]);
        assert_eq!(
            object_fields(&post.shape),
            vec![
                ("id", "uuid".to_string()),
                ("status", "optional<PostStatus>".to_string())
            ]
        );

        let endpoints = &result.service.endpoints;
        let ids: Vec<&String> = endpoints.keys().collect();
        assert_eq!(ids, vec!["createPost", "getPost", "deletePost"]);
        assert_eq!(endpoints["getPost"].docs.as_deref(), Some("Fetch one post"));
        assert_eq!(endpoints["getPost"].path_parameters["id"], PrimitiveType::Uuid);
        assert_eq!(endpoints["deletePost"].response, None);
        assert_eq!(
            endpoints["createPost"].request,
            Some(TypeReference::named("CreatePost"))
        );

        let codes: Vec<&str> = result.diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert!(codes.contains(&REFERENCE_SKIPPED));
        assert!(codes.contains(&PATCH_SKIPPED));
        assert!(!result.has_errors());
    }

    #[test]
    fn definition_document_shape() {
        let document = load_document_str(BLOG_YAML).unwrap();
        let definition = import_document(&document, &ImportOptions::new("Blog")).to_definition();

        assert_eq!(
            definition["types"]["CreatePost"],
            json!({ "fields": { "title": "string", "tags": "optional<list<string>>" } })
        );
        assert_eq!(
            definition["types"]["Post"]["extends"],
            json!(["CreatePost"])
        );
        assert_eq!(
            definition["types"]["PostStatus"],
            json!({ "enum": ["draft", "live"] })
        );
        assert_eq!(
            definition["services"]["http"]["Blog"]["endpoints"]["deletePost"],
            json!({
                "method": "DELETE",
                "path": "/posts/{id}",
                "parameters": { "id": "uuid" },
                "errors": []
            })
        );
    }

    #[test]
    fn unresolved_body_reference_is_reported() {
        let document = json!({
            "openapi": "3.0.0",
            "paths": {
                "/posts/{id}": {
                    "get": {
                        "operationId": "getPost",
                        "responses": { "200": post_response() }
                    }
                }
            }
        });
        let result = import_document(&document, &ImportOptions::default());
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].path, "/paths/~1posts~1{id}/get");
        assert!(result.diagnostics[0].message.contains("\"Post\""));
    }
}
