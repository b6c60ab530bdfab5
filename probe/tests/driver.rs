use std::num::NonZeroUsize;

use adaptive::{FilterConfig, WeightInit};
use comms::{CommsErr, ErrorClass, ProtocolViolation, SessionConfig};
use ndarray::{Array2, array};
use probe::{ProbeDriver, ProbeErr, ResultSet};
use processor::{Processor, ProcessorConfig, SessionSummary};
use tokio::io;

fn signal() -> Array2<u8> {
    // Frames [1,0,1], [0,1,0], [1,1,1] laid out neurons x time.
    array![[1, 0, 1], [0, 1, 1], [1, 0, 1]]
}

#[tokio::test]
async fn nak_aborts_before_streaming() {
    let (probe_end, processor_end) = io::duplex(64);
    let driver = ProbeDriver::new(signal(), SessionConfig::default()).unwrap();

    let fake_processor = async move {
        let (rx, tx) = io::split(processor_end);
        let (mut rx, mut tx) = comms::channel(rx, tx);

        let header = rx.recv_frame(2).await.unwrap().to_vec();
        tx.send_exact(&[0x15]).await.unwrap();

        // Nothing but the end of stream may follow the rejected handshake.
        let next = rx.recv_exact(1).await.unwrap().map(<[u8]>::to_vec);
        (header, next)
    };

    let probe = async move {
        let (rx, tx) = io::split(probe_end);
        let (rx, tx) = comms::channel(rx, tx);
        driver.run(rx, tx).await
    };

    let (result, (header, next)) = tokio::join!(probe, fake_processor);

    assert_eq!(header, [0x00, 0x03]);
    assert!(next.is_none());

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        ProbeErr::Comms(CommsErr::Protocol(ProtocolViolation::AckMismatch { got: 0x15 }))
    ));
    assert_eq!(err.class(), ErrorClass::Protocol);
}

#[tokio::test]
async fn hang_up_instead_of_ack_is_a_protocol_error() {
    let (probe_end, processor_end) = io::duplex(64);
    let driver = ProbeDriver::new(signal(), SessionConfig::default()).unwrap();

    let rejecting_processor = async move {
        let (rx, tx) = io::split(processor_end);
        let (mut rx, mut tx) = comms::channel(rx, tx);

        rx.recv_frame(2).await.unwrap();
        tx.shutdown().await.unwrap();

        rx.recv_exact(1).await.unwrap().map(<[u8]>::to_vec)
    };

    let probe = async move {
        let (rx, tx) = io::split(probe_end);
        let (rx, tx) = comms::channel(rx, tx);
        driver.run(rx, tx).await
    };

    let (result, next) = tokio::join!(probe, rejecting_processor);

    assert!(next.is_none());
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        ProbeErr::Comms(CommsErr::Protocol(ProtocolViolation::MissingAck))
    ));
    assert_eq!(err.class(), ErrorClass::Protocol);
}

#[tokio::test]
async fn processor_hanging_up_mid_run_is_truncation() {
    let (probe_end, processor_end) = io::duplex(64);
    let driver = ProbeDriver::new(signal(), SessionConfig::default()).unwrap();

    let fake_processor = async move {
        let (rx, tx) = io::split(processor_end);
        let (mut rx, mut tx) = comms::channel(rx, tx);

        rx.recv_frame(2).await.unwrap();
        tx.send_exact(&[comms::ACK]).await.unwrap();
        rx.recv_frame(3).await.unwrap();
        // Half of a float64 prediction, then gone.
        tx.send_exact(&[0; 12]).await.unwrap();
        tx.shutdown().await.unwrap();
    };

    let probe = async move {
        let (rx, tx) = io::split(probe_end);
        let (rx, tx) = comms::channel(rx, tx);
        driver.run(rx, tx).await
    };

    let (result, ()) = tokio::join!(probe, fake_processor);

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        ProbeErr::Comms(CommsErr::Truncated {
            got: 12,
            expected: 24
        })
    ));
    assert_eq!(err.class(), ErrorClass::Io);
}

#[test]
fn signal_must_match_a_fixed_neuron_count() {
    let config = SessionConfig {
        handshake: false,
        neurons: NonZeroUsize::new(4),
        ..Default::default()
    };

    let err = ProbeDriver::new(signal(), config).err().unwrap();
    assert!(matches!(
        err,
        ProbeErr::Comms(CommsErr::Protocol(ProtocolViolation::NeuronMismatch {
            got: 3,
            expected: 4
        }))
    ));

    let empty = Array2::<u8>::zeros((0, 5));
    assert!(matches!(
        ProbeDriver::new(empty, SessionConfig::default()),
        Err(ProbeErr::InvalidSignal(_))
    ));
}

#[tokio::test]
async fn end_to_end_over_loopback() {
    let config = ProcessorConfig {
        session: SessionConfig::default(),
        filter: FilterConfig::Lms {
            order: NonZeroUsize::new(2).unwrap(),
            mu: 0.,
            init: WeightInit::Zero,
        },
    };

    let processor = Processor::bind("127.0.0.1:0", config.clone()).await.unwrap();
    let addr = processor.local_addr().unwrap();
    let server = tokio::spawn(processor.serve());

    let driver = ProbeDriver::new(signal(), config.session).unwrap();
    let results = ResultSet::from(driver.connect_and_run(addr).await.unwrap());

    assert_eq!(results.len(), 3);
    assert_eq!(results.filter_preds, vec![vec![0.; 3]; 3]);
    assert!(
        results
            .rt_times_us
            .iter()
            .all(|t| t.is_finite() && *t >= 0.)
    );

    let report = results.latency_report().unwrap();
    assert!(report.min <= report.median && report.median <= report.max);

    let summary = server.await.unwrap().unwrap();
    assert_eq!(
        summary,
        SessionSummary {
            neurons: 3,
            frames: 3
        }
    );
}

#[tokio::test]
async fn end_to_end_without_handshake_in_int8() {
    let session = SessionConfig {
        response: comms::ResponseEncoding::Int8,
        handshake: false,
        neurons: NonZeroUsize::new(3),
        ..Default::default()
    };
    let config = ProcessorConfig {
        session: session.clone(),
        filter: FilterConfig::Echo,
    };

    let processor = Processor::bind("127.0.0.1:0", config).await.unwrap();
    let addr = processor.local_addr().unwrap();
    let server = tokio::spawn(processor.serve());

    let driver = ProbeDriver::new(signal(), session).unwrap();
    let results = ResultSet::from(driver.connect_and_run(addr).await.unwrap());

    assert_eq!(
        results.filter_preds,
        [vec![1., 0., 1.], vec![0., 1., 0.], vec![1., 1., 1.]]
    );
    assert_eq!(server.await.unwrap().unwrap().frames, 3);
}
