// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use googletest::assert_that;
use googletest::prelude::near;
use tuplesketch::common::NumStdDev;
use tuplesketch::theta::MAX_THETA;
use tuplesketch::theta::ThetaSketch;
use tuplesketch::tuple::AnotB;
use tuplesketch::tuple::CompactSketch;
use tuplesketch::tuple::DoubleSummary;
use tuplesketch::tuple::DoubleSummaryFactory;
use tuplesketch::tuple::Sketch;
use tuplesketch::tuple::UpdatableSketch;

fn sketch() -> UpdatableSketch<DoubleSummaryFactory> {
    UpdatableSketch::builder(DoubleSummaryFactory::default()).build()
}

#[test]
fn test_no_update() {
    let mut a_not_b = AnotB::<DoubleSummary>::new();
    let result = a_not_b.get_result();
    assert!(result.is_empty());
    assert_eq!(result.num_retained(), 0);
    assert_eq!(result.estimate(), 0.0);
    assert_eq!(result.theta64(), MAX_THETA);
}

#[test]
fn test_empty_operands() {
    let a = sketch();
    let b = sketch();
    let mut a_not_b = AnotB::<DoubleSummary>::new();
    a_not_b.update(Some(&a), Some(&b));

    let result = a_not_b.get_result();
    assert!(result.is_empty());
    assert!(!result.is_estimation_mode());
    assert_eq!(result.num_retained(), 0);
    assert_eq!(result.estimate(), 0.0);
    assert_eq!(result.lower_bound(NumStdDev::One), 0.0);
    assert_eq!(result.upper_bound(NumStdDev::One), 0.0);

    a_not_b.update(None, None);
    let result = a_not_b.get_result();
    assert!(result.is_empty());
    assert_eq!(result.num_retained(), 0);
}

#[test]
fn test_empty_a() {
    let a = sketch();
    let mut b = sketch();
    b.update(1, 1.0);
    b.update(2, 1.0);

    let mut a_not_b = AnotB::<DoubleSummary>::new();
    a_not_b.update(Some(&a), Some(&b));
    let result = a_not_b.get_result();
    assert!(result.is_empty());
    assert_eq!(result.num_retained(), 0);
    assert_eq!(result.estimate(), 0.0);

    a_not_b.update(None, Some(&b));
    assert!(a_not_b.get_result().is_empty());
}

#[test]
fn test_empty_b() {
    let mut a = sketch();
    a.update(1, 1.0);
    a.update(2, 1.0);
    let b = sketch();

    let mut a_not_b = AnotB::<DoubleSummary>::new();
    a_not_b.update(Some(&a), Some(&b));
    let result = a_not_b.get_result();
    assert!(!result.is_empty());
    assert!(!result.is_estimation_mode());
    assert_eq!(result.num_retained(), 2);
    assert_eq!(result.estimate(), 2.0);
    assert_eq!(result.lower_bound(NumStdDev::One), 2.0);
    assert_eq!(result.upper_bound(NumStdDev::One), 2.0);

    // same thing, but compact sketches
    a_not_b.update(Some(&a.compact()), Some(&b.compact()));
    let result = a_not_b.get_result();
    assert!(!result.is_empty());
    assert_eq!(result.num_retained(), 2);
    assert_eq!(result.estimate(), 2.0);

    a_not_b.update(Some(&a), None);
    assert_eq!(a_not_b.get_result().num_retained(), 2);

    a_not_b.update_theta(Some(&a), None);
    assert_eq!(a_not_b.get_result().num_retained(), 2);
}

#[test]
fn test_exact_mode() {
    let mut a = sketch();
    a.update(1, 1.0);
    a.update(1, 1.0);
    a.update(2, 1.0);
    a.update(2, 1.0);

    let mut b = sketch();
    b.update(2, 1.0);
    b.update(2, 1.0);
    b.update(3, 1.0);
    b.update(3, 1.0);

    let mut a_not_b = AnotB::<DoubleSummary>::new();
    a_not_b.update(Some(&a), Some(&b));
    let result = a_not_b.get_result();
    assert!(!result.is_empty());
    assert!(!result.is_estimation_mode());
    assert_eq!(result.num_retained(), 1);
    assert_eq!(result.estimate(), 1.0);
    let values: Vec<f64> = result.iter().map(|(_, s)| s.value()).collect();
    assert_eq!(values, vec![2.0]);

    // same thing, but compact sketches
    a_not_b.update(Some(&a.compact()), Some(&b.compact()));
    let result = a_not_b.get_result();
    assert_eq!(result.num_retained(), 1);
    let values: Vec<f64> = result.iter().map(|(_, s)| s.value()).collect();
    assert_eq!(values, vec![2.0]);
}

#[test]
fn test_exact_mode_with_theta_sketch() {
    let mut a = sketch();
    a.update(1, 1.0);
    a.update(2, 1.0);
    a.update(3, 1.0);

    let mut b = ThetaSketch::builder().build();
    b.update(2);
    b.update(3);
    b.update(4);

    let mut a_not_b = AnotB::<DoubleSummary>::new();
    a_not_b.update_theta(Some(&a), Some(&b));
    let result = a_not_b.get_result();
    assert_eq!(result.num_retained(), 1);
    assert_eq!(result.estimate(), 1.0);

    let mut expected = sketch();
    expected.update(1, 1.0);
    assert_eq!(result.keys(), expected.compact().keys());
}

#[test]
fn test_sampled_b_without_entries() {
    let mut a = sketch();
    for i in 0..100 {
        a.update(i, 1.0);
    }
    let mut b = UpdatableSketch::builder(DoubleSummaryFactory::default())
        .sampling_probability(1e-6)
        .build();
    b.update("a", 1.0);
    assert!(!b.is_empty());
    assert_eq!(b.num_retained(), 0);

    // b has no entries to subtract, so every entry of a is kept, unfiltered by the narrower theta
    let mut a_not_b = AnotB::<DoubleSummary>::new();
    a_not_b.update(Some(&a), Some(&b));
    let result = a_not_b.get_result();
    assert_eq!(result.num_retained(), a.num_retained());
    assert_eq!(result.theta64(), b.theta64());
    assert_eq!(result.is_empty(), a.is_empty());

    let mut expected: Vec<u64> = a.iter().map(|(key, _)| key).collect();
    let mut actual = result.keys().to_vec();
    expected.sort_unstable();
    actual.sort_unstable();
    assert_eq!(actual, expected);

    let restored = CompactSketch::<DoubleSummary>::deserialize(&result.serialize()).unwrap();
    assert_eq!(restored, result);

    // same thing, but compact sketches
    a_not_b.update(Some(&a.compact()), Some(&b.compact()));
    assert_eq!(a_not_b.get_result(), result);
}

#[test]
fn test_does_not_accumulate() {
    let mut a = sketch();
    let mut b = sketch();
    for i in 0..10 {
        a.update(i, 1.0);
    }
    for i in 5..10 {
        b.update(i, 1.0);
    }

    let mut a_not_b = AnotB::<DoubleSummary>::new();
    a_not_b.update(Some(&a), Some(&b));
    a_not_b.update(Some(&b), Some(&a));
    let result = a_not_b.get_result();
    assert!(!result.is_empty());
    assert_eq!(result.num_retained(), 0);

    // the pending result is consumed
    let result = a_not_b.get_result();
    assert!(result.is_empty());
}

#[test]
fn test_estimation_mode() {
    let mut a = sketch();
    let mut b = sketch();
    for i in 0..8192 {
        a.update(i, 1.0);
        b.update(i + 4096, 1.0);
    }

    let mut a_not_b = AnotB::<DoubleSummary>::new();
    a_not_b.update(Some(&a), Some(&b));
    let result = a_not_b.get_result();
    assert!(!result.is_empty());
    assert!(result.is_estimation_mode());
    assert_eq!(result.theta64(), a.theta64().min(b.theta64()));
    assert_that!(result.estimate(), near(4096.0, 4096.0 * 0.1));
    assert!(result.estimate() >= result.lower_bound(NumStdDev::One));
    assert!(result.estimate() < result.upper_bound(NumStdDev::One));
    assert!(result.iter().all(|(_, s)| s.value() == 1.0));
    assert!(result.iter().all(|(key, _)| key < result.theta64()));

    // same thing, but compact sketches
    a_not_b.update(Some(&a.compact()), Some(&b.compact()));
    let compacted = a_not_b.get_result();
    assert_eq!(compacted.estimate(), result.estimate());
}

#[test]
fn test_estimation_mode_large_b() {
    let mut a = sketch();
    for i in 0..10_000 {
        a.update(i, 1.0);
    }
    let mut b = sketch();
    for i in 8000..108_000 {
        b.update(i, 1.0);
    }

    let mut a_not_b = AnotB::<DoubleSummary>::new();
    a_not_b.update(Some(&a), Some(&b));
    let result = a_not_b.get_result();
    assert!(!result.is_empty());
    assert!(result.is_estimation_mode());
    assert_that!(result.estimate(), near(8000.0, 8000.0 * 0.25));

    // same thing, but compact sketches
    a_not_b.update(Some(&a.compact()), Some(&b.compact()));
    let compacted = a_not_b.get_result();
    assert_eq!(compacted.estimate(), result.estimate());
}
