// Copyright (c) 2026 asm-names Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logger setup shared by the binary and the demos.

use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};

/// Log spec used when `RUST_LOG` is not set.
pub fn default_spec(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "warn"
    }
}

/// Start logging to stderr. `RUST_LOG` wins over the debug flag.
/// Keep the returned handle alive for as long as logging is needed.
pub fn init_logging(debug: bool) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str(default_spec(debug))?
        .log_to_stderr()
        .start()
}
