use lmkit_runtime::{
    ExcludeTokens, NoRepeat, Temperature, TopK, TopP, Transform, TransformPipeline,
};

fn assert_close(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert!((x - y).abs() < 1e-9, "{a:?} != {b:?}");
    }
}

#[test]
fn test_top_k_keeps_highest() {
    let mut probs = vec![0.1, 0.4, 0.2, 0.3];
    TopK(2).apply(&mut probs);
    assert_close(&probs, &[0.0, 0.4, 0.0, 0.3]);
}

#[test]
fn test_top_k_ties_keep_lower_index() {
    let mut probs = vec![0.25, 0.25, 0.25, 0.25];
    TopK(1).apply(&mut probs);
    assert_close(&probs, &[0.25, 0.0, 0.0, 0.0]);
}

#[test]
fn test_top_k_zero_or_large_is_noop() {
    let original = vec![0.1, 0.2, 0.7];
    let mut probs = original.clone();
    TopK(0).apply(&mut probs);
    assert_close(&probs, &original);
    TopK(10).apply(&mut probs);
    assert_close(&probs, &original);
}

#[test]
fn test_top_p_nucleus() {
    let mut probs = vec![0.5, 0.3, 0.15, 0.05];
    TopP(0.7).apply(&mut probs);
    // 0.5 alone does not exceed 0.7; 0.5 + 0.3 does.
    assert_close(&probs, &[0.5, 0.3, 0.0, 0.0]);
}

#[test]
fn test_top_p_unnormalized_input() {
    let mut probs = vec![2.0, 1.0, 1.0];
    TopP(0.5).apply(&mut probs);
    // Threshold is half of the total mass (2.0); 2.0 does not exceed it.
    assert_close(&probs, &[2.0, 1.0, 0.0]);
}

#[test]
fn test_temperature_sharpens() {
    let mut probs = vec![0.5, 0.25, 0.0];
    Temperature(0.5).apply(&mut probs);
    assert_close(&probs, &[0.25, 0.0625, 0.0]);

    let mut untouched = vec![0.5, 0.5];
    Temperature(1.0).apply(&mut untouched);
    assert_close(&untouched, &[0.5, 0.5]);
}

#[test]
fn test_exclude_tokens() {
    let mut probs = vec![0.2, 0.2, 0.2, 0.4];
    ExcludeTokens::new([0, 2, 99]).apply(&mut probs);
    assert_close(&probs, &[0.0, 0.2, 0.0, 0.4]);
}

#[test]
fn test_no_repeat_tracks_committed_tokens() {
    let mut no_repeat = NoRepeat::new([3]);
    no_repeat.advance(1);
    no_repeat.advance(3);
    let mut probs = vec![0.25; 4];
    no_repeat.apply(&mut probs);
    assert_close(&probs, &[0.25, 0.0, 0.25, 0.25]);
}

#[test]
fn test_pipeline_applies_in_order() {
    // Exclusion first leaves index 2 as the single survivor of top-1.
    let pipeline = TransformPipeline::default()
        .with(ExcludeTokens::new([1]))
        .with(TopK(1));
    let mut probs = vec![0.1, 0.6, 0.3];
    pipeline.apply(&mut probs);
    assert_close(&probs, &[0.0, 0.0, 0.3]);

    let reversed = TransformPipeline::default()
        .with(TopK(1))
        .with(ExcludeTokens::new([1]));
    let mut probs = vec![0.1, 0.6, 0.3];
    reversed.apply(&mut probs);
    assert_close(&probs, &[0.0, 0.0, 0.0]);
}

#[test]
fn test_pipeline_clones_are_independent() {
    let mut original = TransformPipeline::default().with(NoRepeat::new([]));
    let snapshot = original.clone();
    original.advance(0);

    let mut probs = vec![0.5, 0.5];
    original.apply(&mut probs);
    assert_close(&probs, &[0.0, 0.5]);

    let mut probs = vec![0.5, 0.5];
    snapshot.apply(&mut probs);
    assert_close(&probs, &[0.5, 0.5]);
}

#[test]
fn test_transforms_preserve_length_and_sign() {
    let pipeline = TransformPipeline::default()
        .with(Temperature(0.7))
        .with(TopP(0.9))
        .with(TopK(3))
        .with(ExcludeTokens::new([0]));
    let mut probs = vec![0.05, 0.3, 0.1, 0.25, 0.2, 0.1];
    pipeline.apply(&mut probs);
    assert_eq!(probs.len(), 6);
    assert!(probs.iter().all(|&p| p >= 0.0));
    assert_eq!(probs.iter().filter(|&&p| p > 0.0).count(), 3);
}
