use core_events::{Event, EventSourceRegistry};
use core_transport::{
    BatchSource, LoopbackTransport, QueryError, Request, TraceReplay, Transport, TransportError,
    query, query_string,
};
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

const DEADLINE: Duration = Duration::from_millis(40);

#[tokio::test]
async fn scripted_reply_arrives_within_deadline() {
    let t = LoopbackTransport::new();
    t.script(Request::mode(), json!("n"));
    let mode = query_string(&t, Request::mode(), DEADLINE).await.unwrap();
    assert_eq!(mode, "n");
}

#[tokio::test]
async fn unanswered_request_is_busy() {
    let t = LoopbackTransport::new();
    let started = tokio::time::Instant::now();
    let err = query(&t, Request::CommandOutput("messages".into()), DEADLINE)
        .await
        .unwrap_err();
    assert_eq!(err, QueryError::Busy);
    assert_eq!(err.to_string(), "neovim busy");
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn timed_out_requests_do_not_stay_parked() {
    let t = LoopbackTransport::new();
    for _ in 0..500 {
        let err = query(&t, Request::mode(), Duration::from_millis(1))
            .await
            .unwrap_err();
        assert_eq!(err, QueryError::Busy);
    }
    assert_eq!(t.parked_requests(), 0);

    let waiting = t.request(Request::mode());
    assert_eq!(t.parked_requests(), 1);
    drop(waiting);
    assert_eq!(t.parked_requests(), 0);
}

#[tokio::test]
async fn late_reply_is_discarded_after_cancellation() {
    let t = LoopbackTransport::new();
    t.script_reply(
        Request::Eval("slow()".into()),
        Ok(json!(1)),
        Some(Duration::from_millis(120)),
    );
    let err = query(&t, Request::Eval("slow()".into()), DEADLINE)
        .await
        .unwrap_err();
    assert_eq!(err, QueryError::Busy);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(t.late_replies(), 1);
}

#[tokio::test]
async fn rejected_and_closed_surface_distinctly() {
    let t = LoopbackTransport::new();
    t.script_reply(
        Request::Eval("bad".into()),
        Err(TransportError::Rejected("E121".into())),
        None,
    );
    assert_eq!(
        query(&t, Request::Eval("bad".into()), DEADLINE).await,
        Err(QueryError::Rejected("E121".into()))
    );
    t.script(Request::Eval("num".into()), json!(3));
    assert!(matches!(
        query_string(&t, Request::Eval("num".into()), DEADLINE).await,
        Err(QueryError::Rejected(_))
    ));
    t.close();
    assert_eq!(
        query(&t, Request::mode(), DEADLINE).await,
        Err(QueryError::Closed)
    );
    assert_eq!(t.send_input("i"), Err(TransportError::Closed));
}

#[tokio::test]
async fn loopback_records_outbound_calls() {
    let t = LoopbackTransport::new();
    t.send_input("<C-a>").unwrap();
    t.send_input("x").unwrap();
    t.request_resize(100, 40).unwrap();
    assert_eq!(t.inputs(), vec!["<C-a>".to_string(), "x".to_string()]);
    assert_eq!(t.resizes(), vec![(100, 40)]);
}

#[tokio::test]
async fn trace_replay_feeds_channel_then_stops() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# recorded session").unwrap();
    writeln!(file, r#"["redraw", [["resize", [10, 2]], ["put", ["h"], ["i"]]]]"#).unwrap();
    writeln!(file, "not json").unwrap();
    writeln!(file).unwrap();
    writeln!(file, r#"["Gui", ["Linespace", 2]]"#).unwrap();
    writeln!(file, r#"["redraw", [["flush", []]]]"#).unwrap();
    file.flush().unwrap();

    let replay = TraceReplay::open(file.path()).await.unwrap();
    let (tx, mut rx) = mpsc::channel(4);
    let mut reg = EventSourceRegistry::new();
    reg.register(BatchSource::new("trace", replay));
    let handles = reg.spawn_all(&tx);
    drop(tx);

    let mut got = Vec::new();
    while let Some(ev) = rx.recv().await {
        got.push(ev);
    }
    let kinds: Vec<_> = got.iter().map(Event::kind_str).collect();
    assert_eq!(kinds, vec!["redraw", "gui", "redraw", "stopped"]);
    match &got[0] {
        Event::Redraw(batch) => assert_eq!(batch.call_count(), 3),
        other => panic!("unexpected {other:?}"),
    }
    for h in handles {
        h.await.unwrap();
    }
}

#[tokio::test]
async fn missing_trace_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(TraceReplay::open(dir.path().join("nope.jsonl")).await.is_err());
}
