// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writes. Callers own the surrounding transaction.

pub mod audit;
pub mod reference;
pub mod visits;
