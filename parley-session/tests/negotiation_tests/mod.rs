mod test_close;
