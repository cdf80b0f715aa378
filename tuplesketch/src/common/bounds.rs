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

//! Confidence bounds on the number of distinct keys represented by a theta-sampled set.
//!
//! A sketch retaining `n` keys below `theta` is a binomial sample of the true population with
//! success probability `theta`. The bounds below use the continuity-corrected normal
//! approximation of that binomial, solved for the population size.

use crate::common::NumStdDev;

/// Returns the lower bound of the population size.
///
/// The result never exceeds the estimate `num_samples / theta` and is never below the number of
/// samples actually seen.
pub(crate) fn lower_bound(num_samples: u64, theta: f64, num_std_dev: NumStdDev) -> f64 {
    let estimate = num_samples as f64 / theta;
    if theta >= 1.0 {
        return estimate;
    }
    if num_samples == 0 {
        return 0.0;
    }
    let lb = continuity_corrected_lower(num_samples as f64, theta, num_std_dev.as_f64());
    estimate.min((num_samples as f64).max(lb))
}

/// Returns the upper bound of the population size.
///
/// The result is never below the estimate. It stays positive for zero samples below a theta
/// smaller than one, since unseen keys may exist above the sampling threshold.
pub(crate) fn upper_bound(num_samples: u64, theta: f64, num_std_dev: NumStdDev) -> f64 {
    let estimate = num_samples as f64 / theta;
    if theta >= 1.0 {
        return estimate;
    }
    let ub = continuity_corrected_upper(num_samples as f64, theta, num_std_dev.as_f64());
    estimate.max(ub)
}

fn continuity_corrected_lower(num_samples: f64, theta: f64, num_std_dev: f64) -> f64 {
    let n_hat = (num_samples - 0.5) / theta;
    let b = num_std_dev * ((1.0 - theta) / theta).sqrt();
    let d = 0.5 * b * (b * b + 4.0 * n_hat).sqrt();
    let center = n_hat + 0.5 * b * b;
    center - d
}

fn continuity_corrected_upper(num_samples: f64, theta: f64, num_std_dev: f64) -> f64 {
    let n_hat = (num_samples + 0.5) / theta;
    let b = num_std_dev * ((1.0 - theta) / theta).sqrt();
    let d = 0.5 * b * (b * b + 4.0 * n_hat).sqrt();
    let center = n_hat + 0.5 * b * b;
    center + d
}
