use std::sync::Arc;
use std::time::Duration;

use dynconf::Error;
use dynconf::JsonValue;
use dynconf::MemKvStore;
use dynconf::WatchConfig;
use dynconf::Watcher;
use tokio::time::sleep;

use crate::common::wait_until;
use crate::common::watch_config;
use crate::common::ServiceConfig;
use crate::common::SETTLE;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watch_follows_operator_edits() {
    let key = "scenario/hello";
    let store = Arc::new(MemKvStore::new());
    let watcher = Watcher::new(store.clone(), watch_config());

    let err = watcher.add_watch(key, ServiceConfig::default).await.unwrap_err();
    assert!(matches!(err, Error::KeyNotFound { .. }));

    let v1 = store.put(key, r#"{"Foo": 99, "Bar": "world"}"#);
    let watch = watcher.add_watch(key, ServiceConfig::default).await.unwrap();
    let first = watch.value();
    assert_eq!((first.foo, first.bar.as_str()), (99, "world"));
    assert_eq!(watch.version(), v1);

    let v2 = store.put(key, r#"{"Foo": 108, "Bar": "haha"}"#);
    assert!(wait_until(SETTLE, || watch.version() == v2).await);
    let second = watch.value();
    assert_eq!((second.foo, second.bar.as_str()), (108, "haha"));
    assert_eq!(first.superseded_count(), 1);

    // A malformed edit is skipped and the last good value stays visible
    store.put(key, r#"{"Foo": 233, "Bar": "bad json"#);
    sleep(Duration::from_millis(1100)).await;
    assert!(Arc::ptr_eq(&second, &watch.value()));
    assert_eq!(watch.version(), v2);
    assert_eq!(second.superseded_count(), 0);

    let v4 = store.put(key, r#"{"Foo": 666, "Bar": "fixed"}"#);
    assert!(wait_until(SETTLE, || watch.version() == v4).await);
    let fourth = watch.value();
    assert_eq!((fourth.foo, fourth.bar.as_str()), (666, "fixed"));
    assert_eq!(first.superseded_count(), 1);
    assert_eq!(second.superseded_count(), 1);

    watch.remove().await;
    assert_eq!(fourth.stopped_count(), 1);
    assert_eq!(first.stopped_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_operator_fix_is_seen_under_default_policy() {
    let key = "scenario/default_policy";
    let store = Arc::new(MemKvStore::new());
    store.put(key, r#"{"Foo": 108, "Bar": "haha"}"#);
    let watcher = Watcher::new(store.clone(), WatchConfig::default());
    let watch = watcher.add_watch(key, ServiceConfig::default).await.unwrap();
    let good = watch.value();

    // A malformed edit stays in the store for several minutes
    store.put(key, r#"{"Foo": 233, "Bar": "bad json"#);
    sleep(Duration::from_secs(600)).await;
    assert!(Arc::ptr_eq(&good, &watch.value()));
    assert!(watch.is_active());

    let fixed = store.put(key, r#"{"Foo": 666, "Bar": "fixed"}"#);
    assert!(wait_until(Duration::from_secs(1), || watch.version() == fixed).await);
    assert_eq!(watch.value().foo, 666);
    assert_eq!(good.superseded_count(), 1);

    watch.remove().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_readers_see_whole_values() {
    let key = "scenario/readers";
    let store = Arc::new(MemKvStore::new());
    store.put(key, r#"{"Foo": 0, "Bar": "0"}"#);
    let watcher = Watcher::new(store.clone(), watch_config());
    let watch = Arc::new(watcher.add_watch(key, ServiceConfig::default).await.unwrap());

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let watch = watch.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let value = watch.value();
                    assert_eq!(value.foo.to_string(), value.bar);
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for i in 1..=5 {
        store.put(key, format!(r#"{{"Foo": {i}, "Bar": "{i}"}}"#));
        sleep(Duration::from_millis(20)).await;
    }

    for result in futures::future::join_all(readers).await {
        result.unwrap();
    }
    assert!(wait_until(SETTLE, || watch.value().foo == 5).await);

    watcher.shutdown();
    assert!(wait_until(SETTLE, || !watch.is_active()).await);
}

#[tokio::test]
async fn test_json_value_watch() {
    #[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
    struct Limits {
        max_connections: u32,
    }

    let key = "scenario/limits";
    let store = Arc::new(MemKvStore::new());
    store.put(key, r#"{"max_connections": 64}"#);
    let watcher = Watcher::new(store.clone(), watch_config());

    let watch = watcher.add_watch(key, JsonValue::<Limits>::default).await.unwrap();
    assert_eq!(watch.value().max_connections, 64);

    store.put(key, r#"{"max_connections": 128}"#);
    assert!(wait_until(SETTLE, || watch.value().max_connections == 128).await);
    assert_eq!(watch.value().to_string(), r#"{"max_connections":128}"#);

    watch.remove().await;
}
