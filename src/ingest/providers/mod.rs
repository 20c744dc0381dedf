pub mod fed_rss;
