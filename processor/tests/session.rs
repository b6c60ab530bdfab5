use std::num::NonZeroUsize;

use adaptive::{FilterConfig, FilterErr, WeightInit};
use comms::{
    ACK, ByteOrder, CommsErr, ErrorClass, FrameCodec, FrameReceiver, FrameSender, HeaderFormat,
    HeaderWidth, ProtocolViolation, ResponseEncoding, SessionConfig,
};
use processor::{ProcessorConfig, ProcessorErr, Session, SessionState, SessionSummary};
use tokio::io::{self, DuplexStream, ReadHalf, WriteHalf};

type Rx = FrameReceiver<ReadHalf<DuplexStream>>;
type Tx = FrameSender<WriteHalf<DuplexStream>>;

/// Wires a session to an in-memory probe end.
fn connect(config: &ProcessorConfig) -> (Session<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>, Rx, Tx) {
    let (probe, processor) = io::duplex(1024);

    let (rx, tx) = io::split(processor);
    let (rx, tx) = comms::channel(rx, tx);
    let session = Session::new(rx, tx, config);

    let (rx, tx) = io::split(probe);
    let (rx, tx) = comms::channel(rx, tx);
    (session, rx, tx)
}

fn echo(response: ResponseEncoding) -> ProcessorConfig {
    ProcessorConfig {
        session: SessionConfig {
            response,
            ..Default::default()
        },
        filter: FilterConfig::Echo,
    }
}

/// Sends each frame and collects the decoded answers, then hangs up.
async fn drive(codec: FrameCodec, rx: &mut Rx, tx: &mut Tx, frames: &[&[u8]]) -> Vec<Vec<f64>> {
    let mut answers = Vec::new();

    for frame in frames {
        tx.send_exact(frame).await.unwrap();

        let bytes = rx.recv_frame(codec.response_size(frame.len())).await.unwrap();
        let mut y = vec![0.0; frame.len()];
        codec.decode_response(bytes, &mut y).unwrap();
        answers.push(y);
    }

    tx.shutdown().await.unwrap();
    answers
}

#[tokio::test]
async fn answers_every_frame_in_order() {
    let config = echo(ResponseEncoding::Float64);
    let codec = FrameCodec::from_config(&config.session);
    let (mut session, mut rx, mut tx) = connect(&config);

    let probe = async {
        tx.send_exact(&[0x00, 0x03]).await.unwrap();
        assert_eq!(rx.recv_frame(1).await.unwrap(), [ACK]);

        let answers = drive(codec, &mut rx, &mut tx, &[&[1, 2, 3], &[4, 5, 6], &[0, 0, 255]]).await;

        // The processor closes its side once the session ends.
        assert!(rx.recv_exact(1).await.unwrap().is_none());
        answers
    };

    let (summary, answers) = tokio::join!(session.run(), probe);

    assert_eq!(
        summary.unwrap(),
        SessionSummary {
            neurons: 3,
            frames: 3
        }
    );
    assert_eq!(
        answers,
        [vec![1., 2., 3.], vec![4., 5., 6.], vec![0., 0., 255.]]
    );
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn lms_predictions_reach_the_probe() {
    let config = ProcessorConfig {
        session: SessionConfig::default(),
        filter: FilterConfig::Lms {
            order: NonZeroUsize::new(2).unwrap(),
            mu: 0.5,
            init: WeightInit::Zero,
        },
    };
    let codec = FrameCodec::from_config(&config.session);
    let (mut session, mut rx, mut tx) = connect(&config);

    let probe = async {
        tx.send_exact(&[0x00, 0x01]).await.unwrap();
        rx.recv_frame(1).await.unwrap();
        drive(codec, &mut rx, &mut tx, &[&[1], &[2], &[3]]).await
    };

    let (summary, answers) = tokio::join!(session.run(), probe);

    assert_eq!(summary.unwrap().frames, 3);
    assert_eq!(answers, [vec![0.], vec![2.], vec![7.]]);
}

#[tokio::test]
async fn int8_responses_are_one_byte_per_neuron() {
    let config = echo(ResponseEncoding::Int8);
    let (mut session, mut rx, mut tx) = connect(&config);

    let probe = async {
        tx.send_exact(&[0x00, 0x02]).await.unwrap();
        rx.recv_frame(1).await.unwrap();

        tx.send_exact(&[7, 200]).await.unwrap();
        let answer = rx.recv_frame(2).await.unwrap().to_vec();
        tx.shutdown().await.unwrap();
        answer
    };

    let (summary, answer) = tokio::join!(session.run(), probe);

    assert!(summary.is_ok());
    assert_eq!(answer, [7, 200]);
}

#[tokio::test]
async fn zero_neuron_header_is_rejected_without_ack() {
    let config = echo(ResponseEncoding::Float64);
    let (mut session, mut rx, mut tx) = connect(&config);

    let probe = async {
        tx.send_exact(&[0x00, 0x00]).await.unwrap();
        rx.recv_exact(1).await.unwrap().map(<[u8]>::to_vec)
    };

    let (result, ack) = tokio::join!(session.run(), probe);

    assert!(ack.is_none());
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        ProcessorErr::Comms(CommsErr::Protocol(ProtocolViolation::ZeroNeurons))
    ));
    assert_eq!(err.class(), ErrorClass::Protocol);
    assert_eq!(session.state(), SessionState::Closed);
}

/// Sends `header` and returns whatever the processor answers before hanging up.
async fn answer_to(header: &[u8], rx: &mut Rx, tx: &mut Tx) -> Option<Vec<u8>> {
    tx.send_exact(header).await.unwrap();
    rx.recv_exact(1).await.unwrap().map(<[u8]>::to_vec)
}

fn wide_header(max_neurons: NonZeroUsize) -> ProcessorConfig {
    ProcessorConfig {
        session: SessionConfig {
            header: HeaderFormat {
                width: HeaderWidth::U64,
                order: ByteOrder::Big,
            },
            max_neurons,
            ..Default::default()
        },
        filter: FilterConfig::default(),
    }
}

#[tokio::test]
async fn header_above_the_ceiling_is_rejected_without_ack() {
    let config = echo(ResponseEncoding::Float64);
    let (mut session, mut rx, mut tx) = connect(&config);

    let (result, ack) = tokio::join!(session.run(), answer_to(&[0xff, 0xff], &mut rx, &mut tx));

    assert!(ack.is_none());
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        ProcessorErr::Comms(CommsErr::Protocol(ProtocolViolation::TooManyNeurons {
            neurons: 65535,
            max: 1024
        }))
    ));
    assert_eq!(err.class(), ErrorClass::Protocol);
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn huge_wide_header_is_rejected_without_ack() {
    let config = wide_header(comms::DEFAULT_MAX_NEURONS);
    let (mut session, mut rx, mut tx) = connect(&config);

    let header = (1u64 << 33).to_be_bytes();
    let (result, ack) = tokio::join!(session.run(), answer_to(&header, &mut rx, &mut tx));

    assert!(ack.is_none());
    assert!(matches!(
        result,
        Err(ProcessorErr::Comms(CommsErr::Protocol(
            ProtocolViolation::TooManyNeurons { .. }
        )))
    ));
}

#[tokio::test]
async fn unallocatable_filter_is_an_error_not_a_panic() {
    let config = wide_header(NonZeroUsize::MAX);
    let (mut session, mut rx, mut tx) = connect(&config);

    let header = (1u64 << 33).to_be_bytes();
    let (result, ack) = tokio::join!(session.run(), answer_to(&header, &mut rx, &mut tx));

    assert!(ack.is_none());
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        ProcessorErr::Filter(FilterErr::TooLarge {
            dim: 8_589_934_592,
            order: 3
        })
    ));
    assert_eq!(err.class(), ErrorClass::Protocol);
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn truncated_frame_closes_with_io_error() {
    let config = echo(ResponseEncoding::Float64);
    let (mut session, mut rx, mut tx) = connect(&config);

    let probe = async {
        tx.send_exact(&[0x00, 0x03]).await.unwrap();
        rx.recv_frame(1).await.unwrap();

        tx.send_exact(&[1, 2]).await.unwrap();
        tx.shutdown().await.unwrap();
    };

    let (result, ()) = tokio::join!(session.run(), probe);

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        ProcessorErr::Comms(CommsErr::Truncated {
            got: 2,
            expected: 3
        })
    ));
    assert_eq!(err.class(), ErrorClass::Io);
}

#[tokio::test]
async fn hang_up_before_the_header_is_an_error() {
    let config = echo(ResponseEncoding::Float64);
    let (mut session, _rx, mut tx) = connect(&config);

    let probe = async {
        tx.send_exact(&[0x00]).await.unwrap();
        tx.shutdown().await.unwrap();
    };

    let (result, ()) = tokio::join!(session.run(), probe);

    assert!(matches!(
        result,
        Err(ProcessorErr::Comms(CommsErr::Truncated {
            got: 1,
            expected: 2
        }))
    ));
}

#[tokio::test]
async fn streams_without_handshake() {
    let config = ProcessorConfig {
        session: SessionConfig {
            handshake: false,
            neurons: NonZeroUsize::new(2),
            ..Default::default()
        },
        filter: FilterConfig::Echo,
    };
    let codec = FrameCodec::from_config(&config.session);
    let (mut session, mut rx, mut tx) = connect(&config);

    let probe = drive(codec, &mut rx, &mut tx, &[&[3, 4], &[5, 6]]);
    let (summary, answers) = tokio::join!(session.run(), probe);

    assert_eq!(
        summary.unwrap(),
        SessionSummary {
            neurons: 2,
            frames: 2
        }
    );
    assert_eq!(answers, [vec![3., 4.], vec![5., 6.]]);
}

#[tokio::test]
async fn closed_session_cannot_run_again() {
    let config = echo(ResponseEncoding::Float64);
    let (mut session, _rx, mut tx) = connect(&config);

    tx.shutdown().await.unwrap();
    assert!(session.run().await.is_err());
    assert!(matches!(
        session.run().await,
        Err(ProcessorErr::SessionClosed)
    ));
}
