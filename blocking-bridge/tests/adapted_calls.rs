//! Blocking calls driven by a scripted collaborator.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use blocking_client::{Delivery, MockCall, MockClient};
use blocking_types::Status;
use pulsar_blocking_bridge::{
    BridgeError, Client, Consumer, ConsumerConfig, MessageId, Producer, ProducerConfig, Reader,
    ReaderConfig, ResultCode,
};

fn client_over(mock: &MockClient) -> Client {
    Client::from_async_client(Arc::new(mock.clone()))
}

// ===========================================
// Scenarios
// ===========================================

#[test]
fn immediate_callback_returns_producer() {
    let mock = MockClient::new();
    let expected = Producer::new(42, "topic-1", "producer-42");
    mock.queue_producer(Ok(expected.clone()));

    let producer = client_over(&mock)
        .create_producer("topic-1", &ProducerConfig::default())
        .unwrap();

    assert_eq!(producer, expected);
    assert_eq!(
        mock.calls(),
        vec![MockCall::CreateProducer {
            topic: "topic-1".to_string()
        }]
    );
}

#[test]
fn delayed_callback_blocks_then_returns_consumer() {
    let mock = MockClient::new();
    mock.set_delivery(Delivery::Delayed(Duration::from_millis(50)));
    let expected = Consumer::new(7, vec!["topic-1".to_string()], "sub-a", "consumer-7");
    mock.queue_consumer(Ok(expected.clone()));

    let start = Instant::now();
    let consumer = client_over(&mock)
        .subscribe("topic-1", "sub-a", &ConsumerConfig::default())
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(50));
    assert_eq!(consumer, expected);
}

#[test]
fn partitions_keep_order() {
    let mock = MockClient::new();
    let expected = vec![
        "topic-x-partition-0".to_string(),
        "topic-x-partition-1".to_string(),
    ];
    mock.queue_partitions(Ok(expected.clone()));

    let partitions = client_over(&mock).get_topic_partitions("topic-x").unwrap();
    assert_eq!(partitions, expected);
}

#[test]
fn not_found_raises_without_reader() {
    let mock = MockClient::new();
    mock.queue_reader(Err(Status::not_found("topic does not exist")));

    let result: Result<Reader, BridgeError> = client_over(&mock).create_reader(
        "missing",
        &MessageId::Earliest,
        &ReaderConfig::default(),
    );

    match result {
        Err(BridgeError::NotFound(message)) => assert_eq!(message, "topic does not exist"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

// ===========================================
// Properties
// ===========================================

#[test]
fn duplicated_callback_returns_first_result_once() {
    let mock = MockClient::new();
    mock.set_delivery(Delivery::Twice);
    mock.queue_producer(Ok(Producer::new(1, "t", "p")));
    mock.queue_producer(Ok(Producer::new(2, "t", "p")));

    let client = client_over(&mock);
    let first = client
        .create_producer("t", &ProducerConfig::default())
        .unwrap();
    let second = client
        .create_producer("t", &ProducerConfig::default())
        .unwrap();

    // The duplicate failure of the first call did not leak into the second.
    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
}

#[test]
fn every_failure_category_is_preserved() {
    let mock = MockClient::new();
    let client = client_over(&mock);

    for code in ResultCode::ALL {
        mock.queue_close(Err(Status::new(code, "scripted")));
        let err = client.close().unwrap_err();
        assert_eq!(err.code(), Some(code));
    }
}

#[test]
fn concurrent_calls_complete_in_reverse_order() {
    let mock = MockClient::new();
    mock.set_delivery(Delivery::Parked);
    mock.queue_partitions(Ok(vec!["first".to_string()]));
    mock.queue_partitions(Ok(vec!["second".to_string()]));

    let client = client_over(&mock);

    let first_client = client.clone();
    let first = thread::spawn(move || first_client.get_topic_partitions("a"));
    while mock.parked_count() < 1 {
        thread::yield_now();
    }

    let second_client = client.clone();
    let second = thread::spawn(move || second_client.get_topic_partitions("b"));
    while mock.parked_count() < 2 {
        thread::yield_now();
    }

    assert!(mock.complete_last_parked());
    assert_eq!(second.join().unwrap().unwrap(), vec!["second".to_string()]);
    assert!(!first.is_finished());

    assert!(mock.complete_next_parked());
    assert_eq!(first.join().unwrap().unwrap(), vec!["first".to_string()]);
}

#[test]
fn operation_arguments_reach_the_collaborator() {
    let mock = MockClient::new();
    mock.queue_consumer(Ok(Consumer::new(3, vec![], "s", "c")));
    mock.queue_reader(Ok(Reader::new(4, "t", MessageId::new(5, 6))));

    let client = client_over(&mock);
    client
        .subscribe_pattern("orders-.*", "s", &ConsumerConfig::default())
        .unwrap();
    client
        .create_reader("t", &MessageId::new(5, 6), &ReaderConfig::default())
        .unwrap();
    client.shutdown();

    assert_eq!(
        mock.calls(),
        vec![
            MockCall::SubscribePattern {
                pattern: "orders-.*".to_string(),
                subscription: "s".to_string(),
            },
            MockCall::CreateReader {
                topic: "t".to_string(),
                start: MessageId::new(5, 6),
            },
            MockCall::Shutdown,
        ]
    );
    assert!(mock.is_shut_down());
}
