//! Integration tests for schema generation.

use ormkit_core::catalog::{Catalog, FieldDef, FieldType, ModelDef, RelationDef};
use ormkit_core::schema::{
    fk_name, index_name, MySqlDialect, PostgresDialect, SchemaConfig, SchemaGenerator,
    SqliteDialect, MAX_IDENTIFIER_LEN,
};
use ormkit_core::Error;
use pretty_assertions::assert_eq;

fn blog_catalog() -> Catalog {
    let review = ModelDef::new("Review")
        .with_field(FieldDef::primary_key("id", FieldType::int()))
        .with_field(FieldDef::new("rating", FieldType::small_int()))
        .with_relation(RelationDef::foreign_key("book", "Book").with_related_name("reviews"));

    let book = ModelDef::new("Book")
        .with_field(FieldDef::primary_key("id", FieldType::int()))
        .with_field(FieldDef::new("title", FieldType::char(200)))
        .with_relation(RelationDef::foreign_key("author", "Author").with_related_name("books"))
        .with_relation(RelationDef::many_to_many("tags", "Tag").with_related_name("books"));

    let tag = ModelDef::new("Tag")
        .with_field(FieldDef::primary_key("id", FieldType::int()))
        .with_field(FieldDef::new("name", FieldType::char(50)).unique());

    let author = ModelDef::new("Author")
        .with_field(FieldDef::primary_key("id", FieldType::int()))
        .with_field(FieldDef::new("name", FieldType::char(100)))
        .with_field(FieldDef::new("age", FieldType::int()).nullable());

    Catalog::new([review, book, tag, author]).unwrap()
}

fn unsafe_config() -> SchemaConfig {
    SchemaConfig::new().with_safe(false)
}

#[test]
fn test_sqlite_blog_schema() {
    let catalog = blog_catalog();
    let sql = SchemaGenerator::new(&catalog, SqliteDialect)
        .with_config(unsafe_config())
        .create_schema_sql()
        .unwrap();

    let expected = [
        r#"CREATE TABLE "tag" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    "name" VARCHAR(50) NOT NULL UNIQUE
);"#,
        r#"CREATE TABLE "author" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    "name" VARCHAR(100) NOT NULL,
    "age" INT
);"#,
        r#"CREATE TABLE "book" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    "title" VARCHAR(200) NOT NULL,
    "author_id" INT NOT NULL REFERENCES "author" ("id") ON DELETE CASCADE
);"#,
        r#"CREATE TABLE "review" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    "rating" SMALLINT NOT NULL,
    "book_id" INT NOT NULL REFERENCES "book" ("id") ON DELETE CASCADE
);"#,
        r#"CREATE TABLE "book_tag" (
    "book_id" INT NOT NULL REFERENCES "book" ("id") ON DELETE CASCADE,
    "tag_id" INT NOT NULL REFERENCES "tag" ("id") ON DELETE CASCADE
);"#,
    ]
    .join("\n");
    assert_eq!(sql, expected);
}

#[test]
fn test_referenced_table_created_first() {
    let book = ModelDef::new("Book")
        .with_field(FieldDef::primary_key("id", FieldType::int()))
        .with_foreign_key("author", "Author");
    let author = ModelDef::new("Author").with_field(FieldDef::primary_key("id", FieldType::int()));
    let catalog = Catalog::new([book, author]).unwrap();

    let sql = SchemaGenerator::new(&catalog, SqliteDialect)
        .create_schema_sql()
        .unwrap();
    let author_at = sql.find(r#"CREATE TABLE IF NOT EXISTS "author""#).unwrap();
    let book_at = sql.find(r#"CREATE TABLE IF NOT EXISTS "book""#).unwrap();
    assert!(author_at < book_at);
    assert!(sql.contains(r#"REFERENCES "author" ("id") ON DELETE CASCADE"#));
}

#[test]
fn test_cyclic_references_rejected() {
    let a = ModelDef::new("A")
        .with_field(FieldDef::primary_key("id", FieldType::int()))
        .with_foreign_key("b", "B");
    let b = ModelDef::new("B")
        .with_field(FieldDef::primary_key("id", FieldType::int()))
        .with_foreign_key("a", "A");
    let catalog = Catalog::new([a, b]).unwrap();

    let err = SchemaGenerator::new(&catalog, SqliteDialect)
        .create_schema_sql()
        .unwrap_err();
    assert!(matches!(&err, Error::Configuration(_)));
    assert_eq!(
        err.to_string(),
        "Can't create schema due to cyclic fk references"
    );
}

#[test]
fn test_self_reference_allowed() {
    let category = ModelDef::new("Category")
        .with_field(FieldDef::primary_key("id", FieldType::int()))
        .with_relation(RelationDef::foreign_key("parent", "Category").nullable());
    let catalog = Catalog::new([category]).unwrap();

    let sql = SchemaGenerator::new(&catalog, SqliteDialect)
        .with_config(unsafe_config())
        .create_schema_sql()
        .unwrap();
    assert_eq!(
        sql,
        r#"CREATE TABLE "category" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    "parent_id" INT REFERENCES "category" ("id") ON DELETE CASCADE
);"#
    );
}

#[test]
fn test_one_to_one_primary_key_keeps_reference() {
    let user = ModelDef::new("User").with_field(FieldDef::primary_key("id", FieldType::int()));
    let profile = ModelDef::new("Profile")
        .with_field(FieldDef::primary_key("user_id", FieldType::int()))
        .with_field(FieldDef::new("bio", FieldType::text()))
        .with_one_to_one("user", "User");
    let catalog = Catalog::new([user, profile]).unwrap();

    let sql = SchemaGenerator::new(&catalog, PostgresDialect)
        .with_config(unsafe_config())
        .create_schema_sql()
        .unwrap();
    assert_eq!(
        sql,
        r#"CREATE TABLE "user" (
    "id" SERIAL NOT NULL PRIMARY KEY
);
CREATE TABLE "profile" (
    "user_id" INT NOT NULL UNIQUE PRIMARY KEY REFERENCES "user" ("id") ON DELETE CASCADE,
    "bio" TEXT NOT NULL
);"#
    );
}

#[test]
fn test_postgres_comments_follow_table() {
    let author = ModelDef::new("Author").with_field(FieldDef::primary_key("id", FieldType::int()));
    let book = ModelDef::new("Book")
        .with_description("Published works")
        .with_field(FieldDef::primary_key("id", FieldType::int()))
        .with_relation(RelationDef::foreign_key("author", "Author").with_description("Written by"))
        .with_relation(
            RelationDef::many_to_many("coauthors", "Author").with_description("Shared credit"),
        );
    let catalog = Catalog::new([author, book]).unwrap();

    let sql = SchemaGenerator::new(&catalog, PostgresDialect)
        .with_config(unsafe_config())
        .create_schema_sql()
        .unwrap();
    assert_eq!(
        sql,
        r#"CREATE TABLE "author" (
    "id" SERIAL NOT NULL PRIMARY KEY
);
CREATE TABLE "book" (
    "id" SERIAL NOT NULL PRIMARY KEY,
    "author_id" INT NOT NULL REFERENCES "author" ("id") ON DELETE CASCADE
);
COMMENT ON COLUMN "book"."author_id" IS 'Written by';
COMMENT ON TABLE "book" IS 'Published works';
CREATE TABLE "book_author" (
    "book_id" INT NOT NULL REFERENCES "book" ("id") ON DELETE CASCADE,
    "author_id" INT NOT NULL REFERENCES "author" ("id") ON DELETE CASCADE
);
COMMENT ON TABLE "book_author" IS 'Shared credit';"#
    );
}

#[test]
fn test_mysql_constraints_inside_table() {
    let author = ModelDef::new("Author").with_field(FieldDef::primary_key("id", FieldType::int()));
    let book = ModelDef::new("Book")
        .with_field(FieldDef::primary_key("id", FieldType::int()))
        .with_field(FieldDef::new("isbn", FieldType::char(13)))
        .with_foreign_key("author", "Author")
        .with_unique_together(["author", "isbn"]);
    let catalog = Catalog::new([author, book]).unwrap();

    let generator = SchemaGenerator::new(&catalog, MySqlDialect::new()).with_config(unsafe_config());
    let sql = generator.create_schema_sql().unwrap();

    let uid = index_name("uid", "book", &["author_id", "isbn"]);
    let fk = fk_name("book", "author_id", "author", "id");
    let expected = format!(
        "CREATE TABLE `author` (
    `id` INT NOT NULL PRIMARY KEY AUTO_INCREMENT
) CHARACTER SET utf8mb4;
CREATE TABLE `book` (
    `id` INT NOT NULL PRIMARY KEY AUTO_INCREMENT,
    `isbn` VARCHAR(13) NOT NULL,
    `author_id` INT NOT NULL,
    UNIQUE KEY `{uid}` (`author_id`, `isbn`),
    CONSTRAINT `{fk}` FOREIGN KEY (`author_id`) REFERENCES `author` (`id`) ON DELETE CASCADE
) CHARACTER SET utf8mb4;"
    );
    assert_eq!(sql, expected);
}

#[test]
fn test_generated_names_fit_identifier_limit() {
    let account = ModelDef::new("CustomerAccount")
        .with_table("customer_account_registry_entries")
        .with_field(FieldDef::primary_key("identifier", FieldType::big_int()));
    let order = ModelDef::new("OrderHistory")
        .with_table("customer_order_history_archive_table")
        .with_field(FieldDef::primary_key("id", FieldType::big_int()))
        .with_field(FieldDef::new("external_reference_code", FieldType::char(64)).with_index())
        .with_field(FieldDef::new("placed_at_timestamp", FieldType::datetime()))
        .with_relation(
            RelationDef::foreign_key("purchasing_customer_account", "CustomerAccount"),
        )
        .with_unique_together(["external_reference_code", "placed_at_timestamp"])
        .with_index(["placed_at_timestamp", "purchasing_customer_account"]);
    let catalog = Catalog::new([account, order]).unwrap();

    let sql = SchemaGenerator::new(&catalog, MySqlDialect::new())
        .create_schema_sql()
        .unwrap();

    let table = "customer_order_history_archive_table";
    let names = [
        index_name("idx", table, &["external_reference_code"]),
        index_name("idx", table, &["placed_at_timestamp", "purchasing_customer_account_id"]),
        index_name("uid", table, &["external_reference_code", "placed_at_timestamp"]),
        fk_name(
            table,
            "purchasing_customer_account_id",
            "customer_account_registry_entries",
            "identifier",
        ),
    ];
    for name in &names {
        assert!(name.chars().count() <= MAX_IDENTIFIER_LEN, "{name} too long");
        assert!(sql.contains(&format!("`{name}`")), "{name} missing from\n{sql}");
    }
}

#[test]
fn test_safe_mode_guards_indexes() {
    let event = ModelDef::new("Event")
        .with_field(FieldDef::primary_key("id", FieldType::int()))
        .with_field(FieldDef::new("kind", FieldType::char(20)).with_index());
    let catalog = Catalog::new([event]).unwrap();

    let sql = SchemaGenerator::new(&catalog, SqliteDialect)
        .create_schema_sql()
        .unwrap();
    let idx = index_name("idx", "event", &["kind"]);
    assert_eq!(
        sql,
        format!(
            r#"CREATE TABLE IF NOT EXISTS "event" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    "kind" VARCHAR(20) NOT NULL
);
CREATE INDEX IF NOT EXISTS "{idx}" ON "event" ("kind");"#
        )
    );
}

#[test]
fn test_self_many_to_many_link_table() {
    let person = ModelDef::new("Person")
        .with_field(FieldDef::primary_key("id", FieldType::int()))
        .with_relation(RelationDef::many_to_many("friends", "Person"));
    let catalog = Catalog::new([person]).unwrap();

    let sql = SchemaGenerator::new(&catalog, SqliteDialect)
        .with_config(unsafe_config())
        .create_schema_sql()
        .unwrap();
    assert_eq!(
        sql,
        r#"CREATE TABLE "person" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL
);
CREATE TABLE "person_person" (
    "person_id" INT NOT NULL REFERENCES "person" ("id") ON DELETE CASCADE,
    "person_rel_id" INT NOT NULL REFERENCES "person" ("id") ON DELETE CASCADE
);"#
    );
}
