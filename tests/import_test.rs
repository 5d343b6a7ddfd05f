mod common;

use common::{create_test_dir, init_managers, test_config, write_template};
use mailforge_core::{ImportOptions, NewTemplate, TemplateError};

#[tokio::test]
async fn test_recursive_import_preserves_the_folder_hierarchy() {
    let project = create_test_dir();
    let state = create_test_dir();
    let (_, templates) = init_managers(&test_config(&project, &state)).await;

    let fixtures = create_test_dir();
    write_template(fixtures.path(), "a.html");
    write_template(fixtures.path(), "sub/b.htm");
    std::fs::write(fixtures.path().join("sub").join("c.txt"), "not a template").unwrap();

    let report = templates
        .import_folder(&fixtures.path().to_string_lossy(), ImportOptions::default())
        .await
        .expect("Should import folder");

    assert_eq!(report.imported.len(), 2);
    assert!(report.failed.is_empty());

    let b = report
        .imported
        .iter()
        .find(|t| t.relative_path == "sub/b.htm")
        .expect("Nested file should be imported");
    assert_eq!(b.folder_path, "sub");

    let a = report
        .imported
        .iter()
        .find(|t| t.relative_path == "a.html")
        .expect("Top-level file should be imported");
    assert_eq!(a.folder_path, "");

    // The .txt file is never considered.
    assert!(templates
        .list_templates()
        .await
        .iter()
        .all(|t| !t.file_path.ends_with("c.txt")));
}

#[tokio::test]
async fn test_non_recursive_import_ignores_subfolders() {
    let project = create_test_dir();
    let state = create_test_dir();
    let (_, templates) = init_managers(&test_config(&project, &state)).await;

    let fixtures = create_test_dir();
    write_template(fixtures.path(), "a.html");
    write_template(fixtures.path(), "sub/b.htm");

    let report = templates
        .import_folder(
            &fixtures.path().to_string_lossy(),
            ImportOptions {
                recursive: false,
                ..Default::default()
            },
        )
        .await
        .expect("Should import folder");

    assert_eq!(report.imported.len(), 1);
    assert_eq!(report.imported[0].relative_path, "a.html");
}

#[tokio::test]
async fn test_import_applies_category_and_tags() {
    let project = create_test_dir();
    let state = create_test_dir();
    let (_, templates) = init_managers(&test_config(&project, &state)).await;

    let fixtures = create_test_dir();
    write_template(fixtures.path(), "promo.html");

    let report = templates
        .import_folder(
            &fixtures.path().to_string_lossy(),
            ImportOptions {
                recursive: true,
                category: Some("campaigns".to_string()),
                tags: vec!["q3".to_string()],
            },
        )
        .await
        .expect("Should import folder");

    assert_eq!(report.imported.len(), 1);
    assert_eq!(report.imported[0].category, "campaigns");
    assert_eq!(report.imported[0].tags, vec!["q3".to_string()]);
}

#[tokio::test]
async fn test_import_collects_per_file_failures_and_continues() {
    let project = create_test_dir();
    let state = create_test_dir();
    let (_, templates) = init_managers(&test_config(&project, &state)).await;

    let fixtures = create_test_dir();
    write_template(fixtures.path(), "fresh.html");
    let duplicate = write_template(fixtures.path(), "dup.html");

    // Pre-register one file so the bulk import hits a duplicate mid-way.
    templates
        .add_template(&duplicate.to_string_lossy(), NewTemplate::default())
        .await
        .expect("Should add template");

    let report = templates
        .import_folder(&fixtures.path().to_string_lossy(), ImportOptions::default())
        .await
        .expect("Partial success is the expected outcome");

    assert_eq!(report.imported.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].path.ends_with("dup.html"));
    assert!(report.failed[0].error.contains("already exists"));

    assert_eq!(templates.list_templates().await.len(), 2);
}

#[tokio::test]
async fn test_import_rejects_invalid_folders() {
    let project = create_test_dir();
    let state = create_test_dir();
    let (_, templates) = init_managers(&test_config(&project, &state)).await;

    let result = templates
        .import_folder("/nonexistent/fixtures", ImportOptions::default())
        .await;
    assert!(matches!(result, Err(TemplateError::AccessDenied(_))));

    let result = templates
        .import_folder("../fixtures", ImportOptions::default())
        .await;
    match result {
        Err(TemplateError::AccessDenied(reason)) => assert!(reason.contains("traversal")),
        other => panic!("Expected traversal denial, got {:?}", other.map(|_| ())),
    }

    let file = write_template(project.path(), "single.html");
    let result = templates
        .import_folder(&file.to_string_lossy(), ImportOptions::default())
        .await;
    assert!(matches!(result, Err(TemplateError::AccessDenied(_))));
}

#[tokio::test]
async fn test_import_registers_the_folder_as_a_workspace() {
    let project = create_test_dir();
    let state = create_test_dir();
    let (workspaces, templates) = init_managers(&test_config(&project, &state)).await;

    let fixtures = create_test_dir();
    write_template(fixtures.path(), "a.html");

    templates
        .import_folder(&fixtures.path().to_string_lossy(), ImportOptions::default())
        .await
        .expect("Should import folder");

    assert!(workspaces.workspace_at(fixtures.path()).await.is_some());
}
