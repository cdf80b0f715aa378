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
use tuplesketch::common::ResizeFactor;
use tuplesketch::theta::ThetaSketch;

#[test]
fn test_basic_update() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();
    assert!(sketch.is_empty());
    assert_eq!(sketch.estimate(), 0.0);

    sketch.update("value1");
    assert!(!sketch.is_empty());
    assert_eq!(sketch.estimate(), 1.0);

    sketch.update("value2");
    assert_eq!(sketch.estimate(), 2.0);
}

#[test]
fn test_update_various_types() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();

    sketch.update("string");
    sketch.update(42i64);
    sketch.update(42u64);
    sketch.update_f64(3.15);
    sketch.update_f64(3.15);
    sketch.update_f32(3.15);
    sketch.update_f32(3.15);
    sketch.update([1u8, 2, 3]);

    assert!(!sketch.is_empty());
    assert_eq!(sketch.estimate(), 5.0);
}

#[test]
fn test_theta_reduction() {
    let mut sketch = ThetaSketch::builder().lg_k(5).build();
    assert!(!sketch.is_estimation_mode());

    for i in 0..1000 {
        sketch.update(format!("value_{}", i));
    }

    assert!(sketch.is_estimation_mode());
    assert!(sketch.theta() < 1.0);
    assert!(sketch.iter().all(|key| key < sketch.theta64()));
}

#[test]
fn test_trim() {
    let mut sketch = ThetaSketch::builder().lg_k(5).build();
    for i in 0..1000 {
        sketch.update(format!("value_{}", i));
    }

    let before_trim = sketch.num_retained();
    sketch.trim();
    assert!(sketch.num_retained() <= before_trim);
    assert_eq!(sketch.num_retained(), 32);
}

#[test]
fn test_reset() {
    let mut sketch = ThetaSketch::builder().lg_k(5).build();
    for i in 0..1000 {
        sketch.update(format!("value_{}", i));
    }
    assert!(!sketch.is_empty());
    assert!(sketch.is_estimation_mode());
    assert!(sketch.theta() < 1.0);

    sketch.reset();
    assert!(sketch.is_empty());
    assert_eq!(sketch.estimate(), 0.0);
    assert_eq!(sketch.theta(), 1.0);
    assert_eq!(sketch.num_retained(), 0);
    assert!(!sketch.is_estimation_mode());
    assert_eq!(sketch.lower_bound(NumStdDev::One), 0.0);
    assert_eq!(sketch.upper_bound(NumStdDev::One), 0.0);
}

#[test]
fn test_estimation_accuracy() {
    let n = 100_000;
    for factor in [ResizeFactor::X1, ResizeFactor::X2, ResizeFactor::X8] {
        let mut sketch = ThetaSketch::builder().resize_factor(factor).build();
        for i in 0..n {
            sketch.update(i);
        }
        assert!(sketch.is_estimation_mode());
        assert_that!(sketch.estimate(), near(n as f64, n as f64 * 0.05));
        assert!(sketch.lower_bound(NumStdDev::Two) <= sketch.estimate());
        assert!(sketch.upper_bound(NumStdDev::Two) >= sketch.estimate());
    }
}

#[test]
fn test_sampling_probability() {
    let mut sketch = ThetaSketch::builder().sampling_probability(0.5).build();
    assert!(sketch.is_empty());
    assert!(!sketch.is_estimation_mode());
    assert_eq!(sketch.estimate(), 0.0);

    for i in 0..1000 {
        sketch.update(i);
    }
    assert!(sketch.is_estimation_mode());
    assert_that!(sketch.theta(), near(0.5, 1e-6));
    assert_that!(sketch.estimate(), near(1000.0, 150.0));
}

#[test]
#[should_panic(expected = "lg_k must be in")]
fn test_invalid_lg_k() {
    ThetaSketch::builder().lg_k(27);
}

#[test]
#[should_panic(expected = "p must be in")]
fn test_invalid_sampling_probability() {
    ThetaSketch::builder().sampling_probability(0.0);
}
