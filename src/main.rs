/* Copyright [2025] [Cerda]
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *    http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::{io::stderr, process::exit};

use clap::Parser;
use dentls::{Commands, Config};


fn main() {
	let result = actual_main();
	exit(result);
}

fn actual_main() -> i32 {
	let opts = Commands::parse();

	tracing_subscriber::fmt()
		.with_max_level(opts.log_level())
		.with_writer(stderr)
		.without_time()
		.with_target(false)
		.init();

	let config = Config::from(&opts);
	match dentls::operations::run(&opts.path, &config) {
		Ok(_) => 0,
		Err(err) => {
			dentls::operations::write_error(&err);
			err.exit_value()
		}
	}
}
