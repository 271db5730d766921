// SPDX-License-Identifier: MIT

use super::*;
use std::path::Path;

#[tokio::test]
async fn spawn_registers_a_live_session() {
    let adapter = FakeSessionAdapter::new();
    adapter
        .spawn("box-one", Path::new("/srv/box-one"), "./start.sh")
        .await
        .unwrap();

    assert!(adapter.exists("box-one"));
    let session = adapter.session("box-one").unwrap();
    assert_eq!(session.cmd, "./start.sh");
}

#[tokio::test]
async fn send_line_on_dead_session_fails() {
    let adapter = FakeSessionAdapter::new();
    adapter
        .spawn("box-one", Path::new("/srv/box-one"), "./start.sh")
        .await
        .unwrap();
    adapter.quit("box-one").await.unwrap();

    assert!(adapter.send_line("box-one", "stop").await.is_err());
}

#[tokio::test]
async fn authorise_without_spawn_fails() {
    let adapter = FakeSessionAdapter::new();
    assert!(adapter.authorise("ghost", "alice").await.is_err());
}

#[tokio::test]
async fn multiuser_then_authorise_records_accounts() {
    let adapter = FakeSessionAdapter::new();
    adapter
        .spawn("box-one", Path::new("/srv/box-one"), "./start.sh")
        .await
        .unwrap();
    adapter.enable_multiuser("box-one").await.unwrap();
    adapter.authorise("box-one", "alice").await.unwrap();
    adapter.authorise("box-one", "bob").await.unwrap();

    let session = adapter.session("box-one").unwrap();
    assert!(session.multiuser);
    assert_eq!(session.authorised, vec!["alice", "bob"]);
}

#[tokio::test]
async fn quit_on_unknown_session_is_a_no_op() {
    let adapter = FakeSessionAdapter::new();
    assert!(adapter.quit("never-existed").await.is_ok());
}
