mod common;

use common::{
    run, run_with, FakeClients, CREATED_INSTANCE_ID, INSTANCE_ID, PAGE_SIZE, PROJECT_ID,
    PROJECT_NAME,
};

#[tokio::test]
async fn limit_stops_pagination_early() {
    let clients = FakeClients::new().with_instances(3 * PAGE_SIZE);
    let outcome = run_with(
        clients,
        &[
            "postgresflex",
            "instance",
            "list",
            "--project-id",
            PROJECT_ID,
            "--limit",
            "110",
            "--output-format",
            "json",
        ],
        "",
    )
    .await;

    assert_eq!(outcome.code, 0, "stderr: {}", outcome.stderr);
    assert_eq!(outcome.calls.count("list_instances"), 2);
    let items: Vec<serde_json::Value> = serde_json::from_str(&outcome.stdout).unwrap();
    assert_eq!(items.len(), 110);
    assert_eq!(items[109]["id"], "instance-109");
}

#[tokio::test]
async fn refusing_confirmation_aborts_cleanly() {
    let outcome = run(
        &[
            "postgresflex",
            "instance",
            "delete",
            INSTANCE_ID,
            "--project-id",
            PROJECT_ID,
        ],
        "no\n",
    )
    .await;

    assert_eq!(outcome.code, 0);
    assert!(outcome.stderr.contains("Are you sure you want to delete instance \"example-instance\"?"));
    assert!(outcome.stderr.trim_end().ends_with("aborted"), "{}", outcome.stderr);
    assert_eq!(outcome.calls.count("delete_instance"), 0);
    assert!(outcome.stdout.is_empty());
}

#[tokio::test]
async fn update_without_changes_is_rejected() {
    let outcome = run(
        &[
            "postgresflex",
            "instance",
            "update",
            INSTANCE_ID,
            "--project-id",
            PROJECT_ID,
        ],
        "",
    )
    .await;

    assert_eq!(outcome.code, 1);
    assert_eq!(outcome.stderr, "Error: no values provided to update\n");
    assert_eq!(outcome.calls.total(), 0);
}

#[tokio::test]
async fn empty_list_as_json_prints_an_array() {
    let outcome = run(
        &[
            "postgresflex",
            "instance",
            "list",
            "--project-id",
            PROJECT_ID,
            "--output-format",
            "json",
        ],
        "",
    )
    .await;

    assert_eq!(outcome.code, 0);
    assert_eq!(outcome.stdout, "[]\n");
    assert_eq!(outcome.stderr, "");
}

#[tokio::test]
async fn async_create_does_not_wait() {
    let outcome = run(
        &[
            "postgresflex",
            "instance",
            "create",
            "--project-id",
            PROJECT_ID,
            "--name",
            "example-instance",
            "--acl",
            "0.0.0.0/0",
            "--cpu",
            "2",
            "--ram",
            "4",
            "--async",
            "--assume-yes",
        ],
        "",
    )
    .await;

    assert_eq!(outcome.code, 0, "stderr: {}", outcome.stderr);
    assert_eq!(outcome.calls.count("create_instance"), 1);
    assert_eq!(outcome.calls.count("get_instance"), 0);
    assert_eq!(
        outcome.stdout,
        format!(
            "Triggered creation of instance for project \"{}\". Instance ID: {}\n",
            PROJECT_NAME, CREATED_INSTANCE_ID
        )
    );
}

#[tokio::test]
async fn invalid_cidr_fails_before_any_request() {
    let outcome = run(
        &[
            "postgresflex",
            "instance",
            "create",
            "--project-id",
            PROJECT_ID,
            "--name",
            "example-instance",
            "--acl",
            "10.0.0.0/33",
            "--cpu",
            "2",
            "--ram",
            "4",
        ],
        "",
    )
    .await;

    assert_eq!(outcome.code, 1);
    assert!(outcome.stderr.starts_with("Error: invalid --acl"), "{}", outcome.stderr);
    assert!(outcome
        .stderr
        .ends_with("For usage help, run `stackit postgresflex instance create --help`\n"));
    assert_eq!(outcome.calls.total(), 0);
}

#[tokio::test]
async fn confirmed_delete_without_waiting() {
    let outcome = run(
        &[
            "postgresflex",
            "instance",
            "delete",
            INSTANCE_ID,
            "--project-id",
            PROJECT_ID,
            "--async",
        ],
        "y\n",
    )
    .await;

    assert_eq!(outcome.code, 0, "stderr: {}", outcome.stderr);
    assert_eq!(outcome.calls.count("delete_instance"), 1);
    assert!(outcome
        .stderr
        .contains("Triggered deletion of instance \"example-instance\""));
}

#[tokio::test]
async fn missing_project_is_reported() {
    let outcome = run(&["postgresflex", "instance", "list"], "").await;
    assert_eq!(outcome.code, 1);
    assert!(outcome.stderr.starts_with("Error: no project ID set"), "{}", outcome.stderr);
}

#[tokio::test]
async fn group_without_subcommand_prints_help() {
    let outcome = run(&["postgresflex"], "").await;
    assert_eq!(outcome.code, 0);
    assert!(outcome.stdout.contains("instance"));
    assert_eq!(outcome.calls.total(), 0);
}

#[tokio::test]
async fn credentials_list_reports_empty_result() {
    let outcome = run(
        &[
            "load-balancer",
            "observability-credentials",
            "list",
            "--project-id",
            PROJECT_ID,
            "--unused",
        ],
        "",
    )
    .await;

    assert_eq!(outcome.code, 0);
    assert_eq!(outcome.calls.count("list_load_balancers"), 1);
    assert_eq!(
        outcome.stderr,
        format!(
            "No unused observability credentials found for Load Balancer on project \"{}\"\n",
            PROJECT_NAME
        )
    );
}

#[tokio::test]
async fn delayed_deleted_instance_needs_force() {
    let clients = FakeClients::new().with_instance_status("Deleted");
    let outcome = run_with(
        clients,
        &["postgresflex", "instance", "delete", INSTANCE_ID, "--project-id", PROJECT_ID, "-y"],
        "",
    )
    .await;

    assert_eq!(outcome.code, 1);
    assert!(outcome.stderr.contains("--force"), "{}", outcome.stderr);
    assert_eq!(outcome.calls.count("delete_instance"), 0);
    assert_eq!(outcome.calls.count("force_delete_instance"), 0);
}

#[tokio::test]
async fn force_delete_removes_a_live_instance() {
    let outcome = run(
        &[
            "postgresflex",
            "instance",
            "delete",
            INSTANCE_ID,
            "--project-id",
            PROJECT_ID,
            "--force",
            "-y",
        ],
        "",
    )
    .await;

    assert_eq!(outcome.code, 0, "stderr: {}", outcome.stderr);
    assert_eq!(outcome.calls.count("delete_instance"), 1);
    assert_eq!(outcome.calls.count("force_delete_instance"), 1);
    assert!(outcome
        .stderr
        .contains("Forcefully deleted instance \"example-instance\""));
}

#[tokio::test]
async fn credentials_update_keeps_unset_fields() {
    let outcome = run(
        &[
            "load-balancer",
            "observability-credentials",
            "update",
            "credentials-abc",
            "--project-id",
            PROJECT_ID,
            "--password",
            "hunter2",
            "-y",
        ],
        "",
    )
    .await;

    assert_eq!(outcome.code, 0, "stderr: {}", outcome.stderr);
    assert_eq!(outcome.calls.count("get_credentials"), 1);
    assert_eq!(outcome.calls.count("update_credentials"), 1);
    assert!(outcome.stderr.contains(&format!(
        "Updated observability credentials \"observability\" for Load Balancer on project \"{}\"",
        PROJECT_NAME
    )));
}

#[tokio::test]
async fn logme_update_without_waiting() {
    let outcome = run(
        &[
            "logme",
            "instance",
            "update",
            INSTANCE_ID,
            "--project-id",
            PROJECT_ID,
            "--acl",
            "1.2.3.0/24",
            "--async",
            "-y",
        ],
        "",
    )
    .await;

    assert_eq!(outcome.code, 0, "stderr: {}", outcome.stderr);
    assert_eq!(outcome.calls.count("list_offerings"), 1);
    assert_eq!(outcome.calls.count("logme_partial_update_instance"), 1);
    assert!(outcome
        .stderr
        .contains("Triggered update of instance \"example-logme\""));
}
