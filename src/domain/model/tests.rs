// Unit tests for domain models

use super::*;
use crate::domain::errors::DomainError;

#[test]
fn test_time_spec_parse_three_components() {
    assert_eq!(TimeSpec::parse("00:01:30").unwrap().as_seconds(), 90.0);
    assert_eq!(TimeSpec::parse("1:02:03.5").unwrap().as_seconds(), 3723.5);
}

#[test]
fn test_time_spec_parse_fewer_components() {
    assert_eq!(TimeSpec::parse("45").unwrap().as_seconds(), 45.0);
    assert_eq!(TimeSpec::parse("12.25").unwrap().as_seconds(), 12.25);
    assert_eq!(TimeSpec::parse("2:30.5").unwrap().as_seconds(), 150.5);
    assert_eq!(TimeSpec::parse("  0:05 ").unwrap().as_seconds(), 5.0);
}

#[test]
fn test_time_spec_parse_does_not_range_check_components() {
    assert_eq!(TimeSpec::parse("0:90").unwrap().as_seconds(), 90.0);
}

#[test]
fn test_time_spec_parse_rejects_malformed() {
    for bad in [
        "bad", "", "1:2:3:4", "-5", "1:-2", "a:10", "1.5:10", "10:", ":10", "1..2", "inf", "NaN",
    ] {
        match TimeSpec::parse(bad) {
            Err(DomainError::InvalidFormat { .. }) => {}
            other => panic!("expected InvalidFormat for {:?}, got {:?}", bad, other),
        }
    }
}

#[test]
fn test_format_seconds_pads_and_truncates() {
    assert_eq!(format_seconds(0.0), "00:00:00");
    assert_eq!(format_seconds(90.0), "00:01:30");
    assert_eq!(format_seconds(3723.9), "01:02:03");
    assert_eq!(format_seconds(-4.0), "00:00:00");
    assert_eq!(format_seconds(360000.0), "100:00:00");
}

#[test]
fn test_whole_second_round_trip() {
    for text in ["00:00:00", "00:00:59", "00:59:59", "01:00:00", "12:34:56", "99:59:59"] {
        let seconds = TimeSpec::parse(text).unwrap().as_seconds();
        assert_eq!(format_seconds(seconds.floor()), text);
    }
}

#[test]
fn test_fractional_seconds_do_not_round_trip() {
    let seconds = TimeSpec::parse("00:00:10.75").unwrap().as_seconds();
    assert_eq!(TimeSpec::from_seconds(seconds).format_hms(), "00:00:10");
}

#[test]
fn test_time_span_rejects_reversed_and_empty() {
    assert!(matches!(
        TimeSpan::new(10.0, 5.0),
        Err(DomainError::RangeOutOfBounds { .. })
    ));
    assert!(matches!(
        TimeSpan::new(5.0, 5.0),
        Err(DomainError::RangeOutOfBounds { .. })
    ));
    assert!(matches!(
        TimeSpan::new(-1.0, 5.0),
        Err(DomainError::RangeOutOfBounds { .. })
    ));
}

#[test]
fn test_time_span_against_duration() {
    let span = TimeSpan::new(10.0, 20.0).unwrap();
    assert_eq!(span.duration(), 10.0);
    assert!(span.validate_against_duration(60.0).is_ok());
    assert!(span.validate_against_duration(20.0).is_ok());
    assert!(matches!(
        span.validate_against_duration(15.0),
        Err(DomainError::RangeOutOfBounds { .. })
    ));
}

#[test]
fn test_hand_built_reversed_span_rejected() {
    let reversed = TimeSpan { start: 10.0, end: 5.0 };
    assert!(matches!(
        reversed.validate(),
        Err(DomainError::RangeOutOfBounds { .. })
    ));
    assert!(matches!(
        reversed.validate_against_duration(60.0),
        Err(DomainError::RangeOutOfBounds { .. })
    ));
    assert!(TimeSpan { start: -1.0, end: 5.0 }.validate().is_err());
    assert!(TimeSpan { start: 0.0, end: f64::NAN }.validate().is_err());
}

#[test]
fn test_time_span_deserialize_checks_order() {
    let span: TimeSpan = serde_json::from_str(r#"{"start":1.5,"end":4.0}"#).unwrap();
    assert_eq!(span, TimeSpan { start: 1.5, end: 4.0 });
    assert!(serde_json::from_str::<TimeSpan>(r#"{"start":10.0,"end":5.0}"#).is_err());
}

#[test]
fn test_time_span_parse_uses_codec() {
    let span = TimeSpan::parse("00:00:10", "00:00:20").unwrap();
    assert_eq!(span, TimeSpan { start: 10.0, end: 20.0 });
    assert!(matches!(
        TimeSpan::parse("00:00:10", "oops"),
        Err(DomainError::InvalidFormat { .. })
    ));
}

#[test]
fn test_cut_mode_parse() {
    assert_eq!(CutMode::parse("AUTO").unwrap(), CutMode::Auto);
    assert_eq!(CutMode::parse("copy").unwrap(), CutMode::Copy);
    assert_eq!(CutMode::parse("re-encode").unwrap(), CutMode::Reencode);
    assert!(CutMode::parse("hybrid").is_err());
}

#[test]
fn test_crop_filter_expression() {
    let geometry = CropGeometry {
        left: 200,
        right: 200,
        width: 1520,
        height: 1080,
    };
    assert_eq!(geometry.filter(), "crop=1520:1080:200:0");
}

#[test]
fn test_encoder_settings_validation() {
    assert!(EncoderSettings::default().validate().is_ok());
    let settings = EncoderSettings {
        crf: 52,
        ..EncoderSettings::default()
    };
    assert!(matches!(settings.validate(), Err(DomainError::BadArgs(_))));
}

#[test]
fn test_media_job_outputs() {
    let job = MediaJob::new(
        "in.mp4",
        "left.mp4",
        JobOperation::SplitVertical {
            right_output: "right.mp4".into(),
        },
    );
    assert_eq!(job.outputs().len(), 2);
    assert!(job.describe().starts_with("split"));
}

#[test]
fn test_batch_report_names_failed_items() {
    let mut report = BatchReport::new("split");
    report.push(ItemOutcome::success("left", "left.mp4"));
    report.push(ItemOutcome::failure(
        "right",
        "right.mp4",
        DomainError::EncodeFailed {
            output: "right.mp4".to_string(),
            diagnostic: "boom".to_string(),
        },
    ));

    assert!(!report.all_succeeded());
    assert_eq!(report.succeeded().count(), 1);
    assert!(report.item("left").unwrap().is_success());

    match report.into_result() {
        Err(DomainError::PartialFailure { operation, failed }) => {
            assert_eq!(operation, "split");
            assert_eq!(failed, vec!["right".to_string()]);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_platform_parse() {
    assert_eq!(Platform::parse("TikTok").unwrap(), Platform::TikTok);
    assert!(Platform::parse("myspace").is_err());
}
