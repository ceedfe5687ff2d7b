//! Fixed instruction templates for the two pipeline stages

/// Label of the flattened file contents segment
pub const SOURCE_FILES_LABEL: &str = "Source files";

/// Label of the directory tree segment. The tree text carries its own
/// `Directory structure:` header, so the label must differ from it.
pub const REPOSITORY_LAYOUT_LABEL: &str = "Repository layout";

/// Label of the migration plan segment fed to the schema stage
pub const MIGRATION_PLAN_LABEL: &str = "Migration plan";

pub const MIGRATION_PLAN_SYSTEM: &str = "You are an expert Java developer specializing in \
Spring Boot and MongoDB migrations.";

pub const MIGRATION_PLAN_INSTRUCTIONS: &str = r#"Analyze the Java application below and write a detailed migration plan that converts this exact project into a Spring Boot application backed by MongoDB.

The application currently runs on the JBoss EAP application server against a relational database. The target stack is the latest stable Spring Boot release on Java 21, using MongoDB instead of the relational database.

The input has two parts:
- "Source files": the path and full contents of every file in the repository
- "Repository layout": the directory tree of the repository

Write the plan as a Markdown document. It must cover:
1. Setting up the new Spring Boot project
2. Migrating each existing Java class to its Spring Boot counterpart
3. Replacing the relational persistence layer with MongoDB
4. Required configuration changes
5. Updates to the build process
6. Testing considerations

Refer to concrete files and classes from the source wherever a step applies to them."#;

pub const SCHEMA_SYSTEM: &str = "You are an expert in database design, specializing in \
MongoDB schema design.";

pub const SCHEMA_INSTRUCTIONS: &str = r#"Below is a migration plan for moving a Java application from a relational database to Spring Boot with MongoDB. Using only that plan, design the MongoDB schema the migrated application should use.

Write the result as a Markdown document. It must cover:
- Java files that change to support MongoDB
- Document structures for each collection
- Embedded documents versus references, with the reasoning for each choice
- Indexing strategy
- Data transformations needed to move existing relational data
- Configuration changes and MongoDB dependencies
- A MongoDB initialization script
- Detailed implementation steps
- Testing strategy"#;
