// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod suppliers;
pub mod products;
pub mod orders;
pub mod budgets;
pub mod reports;
pub mod importer;
pub mod settlements;
pub mod receipts;
pub mod exporter;
pub mod doctor;
