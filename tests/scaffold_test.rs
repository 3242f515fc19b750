//! Generator tests: whole option matrix, writing and resource generation.

use std::fs;

use chrono::{TimeZone, Utc};

use backend_forge::errors::AppError;
use backend_forge::scaffold::resource::generate_resource_at;
use backend_forge::scaffold::{
    generate_resource, write_plan, AuthStrategy, Authorization, Database, Manifest, Plan,
    ScaffoldOptions, Secrets, WriteMode,
};

fn options(database: Database, auth: AuthStrategy, authz: Authorization) -> ScaffoldOptions {
    ScaffoldOptions::new("shop", database, auth, authz)
}

fn resolve(options: &ScaffoldOptions) -> Plan {
    Plan::resolve(options, &Secrets::fixed("shop")).unwrap()
}

fn contents<'a>(plan: &'a Plan, path: &str) -> &'a str {
    &plan
        .get(path)
        .unwrap_or_else(|| panic!("{} missing from plan", path))
        .contents
}

// =============================================================================
// Plan resolution
// =============================================================================

#[test]
fn test_every_combination_resolves() {
    let combinations = ScaffoldOptions::all_combinations("shop");
    assert_eq!(combinations.len(), 18);

    for options in combinations {
        let plan = Plan::resolve(&options, &Secrets::fixed("shop"))
            .unwrap_or_else(|e| panic!("{} failed: {}", options.label(), e));

        for required in ["Cargo.toml", "src/main.rs", "src/lib.rs", "src/routes.rs", "forge.json"] {
            assert!(plan.get(required).is_some(), "{} lacks {}", options.label(), required);
        }
        assert_eq!(plan.manifest().options, options);
    }
}

#[test]
fn test_plan_is_deterministic_with_fixed_secrets() {
    let options = options(Database::Mysql, AuthStrategy::Local, Authorization::Policies);
    let first = resolve(&options);
    let second = resolve(&options);

    let a: Vec<_> = first.files().map(|f| (&f.path, &f.contents)).collect();
    let b: Vec<_> = second.files().map(|f| (&f.path, &f.contents)).collect();
    assert_eq!(a, b);
}

#[test]
fn test_jwt_postgres_wiring() {
    let plan = resolve(&options(Database::Postgresql, AuthStrategy::Jwt, Authorization::None));

    let cargo = contents(&plan, "Cargo.toml");
    assert!(cargo.contains("jsonwebtoken = \"9\""));
    assert!(cargo.contains("sqlx-postgres"));
    assert!(!cargo.contains("tower-sessions"));

    let routes = contents(&plan, "src/routes.rs");
    assert!(routes.contains(".nest(\"/auth\", auth::routes())"));
    assert!(routes.contains(".merge(users::routes())"));

    assert!(plan.get("views/login.html").is_none());
    assert!(plan.get("src/migrations/mod.rs").is_some());
}

#[test]
fn test_session_strategies_bring_views_and_sessions() {
    for auth in [AuthStrategy::Local, AuthStrategy::Oauth2] {
        let plan = resolve(&options(Database::Mysql, auth, Authorization::None));

        assert!(plan.get("views/login.html").is_some());
        assert!(plan.get("src/auth/flash.rs").is_some());
        assert!(contents(&plan, "Cargo.toml").contains("tower-sessions"));
        assert!(contents(&plan, ".env").contains("SESSION_SECRET="));
    }
}

#[test]
fn test_sessions_are_persisted_in_the_database() {
    let plan = resolve(&options(Database::Postgresql, AuthStrategy::Local, Authorization::None));

    let routes = contents(&plan, "src/routes.rs");
    assert!(!routes.contains("MemoryStore"));
    assert!(routes.contains("SessionManagerLayer::new(DbSessionStore::new(&state.db))"));
    assert!(routes.contains(".with_signed(key)"));
    assert!(contents(&plan, "src/auth/mod.rs").contains("pub mod session_store;"));
    assert!(contents(&plan, "src/main.rs").contains("session_store::start_expiry(&db)"));

    let migrations = contents(&plan, "src/migrations/mod.rs");
    assert!(migrations.contains("mod m20240101_000002_create_sessions;"));
    assert!(migrations.contains("Box::new(m20240101_000002_create_sessions::Migration),"));

    let plan = resolve(&options(Database::Mongodb, AuthStrategy::Oauth2, Authorization::None));
    assert!(!contents(&plan, "src/routes.rs").contains("MemoryStore"));
    assert!(contents(&plan, "src/auth/session_store.rs").contains("expire_after"));

    let plan = resolve(&options(Database::Mysql, AuthStrategy::Jwt, Authorization::None));
    assert!(plan.get("src/auth/session_store.rs").is_none());
    assert!(!contents(&plan, "src/migrations/mod.rs").contains("create_sessions"));
}

#[test]
fn test_password_hashing_enables_os_rng() {
    for options in ScaffoldOptions::all_combinations("shop") {
        let plan = resolve(&options);
        let cargo = contents(&plan, "Cargo.toml");
        let hashes_passwords = plan.get("src/auth/password.rs").is_some();

        assert_eq!(cargo.contains("argon2 = "), hashes_passwords, "{}", options.label());
        if hashes_passwords {
            assert!(
                cargo.contains(r#"password-hash = { version = "0.5", features = ["getrandom"] }"#),
                "{} lacks getrandom for OsRng",
                options.label()
            );
        }
    }
}

#[test]
fn test_users_are_readable_by_owner_only_under_policies() {
    for auth in [AuthStrategy::Jwt, AuthStrategy::Local] {
        let plan = resolve(&options(Database::Postgresql, auth, Authorization::Policies));

        let users_mod = contents(&plan, "src/users/mod.rs");
        assert!(users_mod.contains("check_on(Action::Read, Subject::User, &found.id)"));
        let ability = contents(&plan, "src/policies/ability.rs");
        assert!(ability.contains("allow_owned(Action::Read, Subject::User, &user.id)"));
    }
}

#[test]
fn test_mongodb_has_no_sql_migrations() {
    let plan = resolve(&options(Database::Mongodb, AuthStrategy::Jwt, Authorization::None));

    assert!(plan.get("src/migrations/mod.rs").is_none());
    assert!(contents(&plan, "Cargo.toml").contains("mongodb"));
    assert!(!contents(&plan, "Cargo.toml").contains("sea-orm"));
}

#[test]
fn test_policies_override_users_registration() {
    let plan = resolve(&options(Database::Postgresql, AuthStrategy::Jwt, Authorization::Policies));

    let users_mod = plan
        .overrides()
        .iter()
        .find(|o| o.path == "src/users/mod.rs")
        .expect("users module should be overridden");
    assert_eq!(users_mod.replaced, "users-bearer");
    assert_eq!(users_mod.by, "authz-policies-bearer");

    assert!(contents(&plan, "src/users/mod.rs").contains("PoliciesGuard"));
    assert!(contents(&plan, "src/lib.rs").contains("pub mod policies;"));
    assert!(contents(&plan, "src/policies/mod.rs").contains("mod guard;"));
}

#[test]
fn test_invalid_project_name_is_rejected() {
    let options = ScaffoldOptions::new("1shop", Database::Mysql, AuthStrategy::Jwt, Authorization::None);
    let result = Plan::resolve(&options, &Secrets::fixed("x"));
    assert!(matches!(result, Err(AppError::Validation(_))));
}

// =============================================================================
// Writing
// =============================================================================

#[test]
fn test_write_plan_modes() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("shop");
    let plan = resolve(&options(Database::Postgresql, AuthStrategy::Jwt, Authorization::None));

    let dry = write_plan(&plan, &root, WriteMode::DryRun).unwrap();
    assert_eq!(dry.created.len(), plan.len());
    assert!(!root.exists());

    let created = write_plan(&plan, &root, WriteMode::CreateNew).unwrap();
    assert_eq!(created.total(), plan.len());
    assert!(root.join("src/main.rs").is_file());

    let again = write_plan(&plan, &root, WriteMode::CreateNew);
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let overwritten = write_plan(&plan, &root, WriteMode::Overwrite).unwrap();
    assert_eq!(overwritten.overwritten.len(), plan.len());
    assert!(overwritten.created.is_empty());
}

// =============================================================================
// Resource generation
// =============================================================================

fn scaffold(options: &ScaffoldOptions) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_plan(&resolve(options), dir.path(), WriteMode::Overwrite).unwrap();
    dir
}

#[test]
fn test_generate_resource_sql_rewires_project() {
    let dir = scaffold(&options(Database::Postgresql, AuthStrategy::Jwt, Authorization::None));
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();

    let report = generate_resource_at(dir.path(), "Product", now).unwrap();
    assert_eq!(report.module, "products");
    assert_eq!(report.migration.as_deref(), Some("m20240501_123000_create_products"));
    assert!(report.created.contains(&"src/products/handlers.rs".to_string()));
    assert!(report
        .created
        .contains(&"src/migrations/m20240501_123000_create_products.rs".to_string()));

    let lib = fs::read_to_string(dir.path().join("src/lib.rs")).unwrap();
    assert!(lib.contains("pub mod products;"));
    let routes = fs::read_to_string(dir.path().join("src/routes.rs")).unwrap();
    assert!(routes.contains(".merge(products::routes())"));
    let migrations = fs::read_to_string(dir.path().join("src/migrations/mod.rs")).unwrap();
    assert!(migrations.contains("mod m20240501_123000_create_products;"));
    assert!(migrations.contains("Box::new(m20240501_123000_create_products::Migration),"));

    let manifest = Manifest::load(dir.path()).unwrap();
    assert!(manifest.modules.contains(&"products".to_string()));
    assert_eq!(manifest.resources, vec!["products"]);
    assert!(manifest.files.contains(&"src/products/service.rs".to_string()));
}

#[test]
fn test_generate_resource_mongodb_session() {
    let dir = scaffold(&options(Database::Mongodb, AuthStrategy::Local, Authorization::None));

    let report = generate_resource(dir.path(), "order").unwrap();
    assert_eq!(report.module, "orders");
    assert!(report.migration.is_none());

    let handlers = fs::read_to_string(dir.path().join("src/orders/handlers.rs")).unwrap();
    assert!(handlers.contains("Redirect"));
}

#[test]
fn test_generate_resource_twice_conflicts() {
    let dir = scaffold(&options(Database::Mysql, AuthStrategy::Jwt, Authorization::None));

    generate_resource(dir.path(), "product").unwrap();
    let again = generate_resource(dir.path(), "product");
    assert!(matches!(again, Err(AppError::Conflict(_))));
}

#[test]
#[ignore = "runs cargo check on every generated project; needs network access"]
fn test_generated_projects_compile() {
    for options in ScaffoldOptions::all_combinations("shop") {
        let dir = scaffold(&options);
        let status = std::process::Command::new(env!("CARGO"))
            .args(["check", "--quiet"])
            .current_dir(dir.path())
            .status()
            .unwrap();
        assert!(status.success(), "{} does not compile", options.label());
    }
}

#[test]
fn test_generate_resource_outside_project() {
    let dir = tempfile::tempdir().unwrap();
    let result = generate_resource(dir.path(), "product");
    assert!(matches!(result, Err(AppError::Validation(_))));
}
