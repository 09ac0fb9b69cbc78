use zbx_nginx_stats::entry;
use zbx_nginx_stats::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
