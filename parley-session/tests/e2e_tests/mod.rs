mod test_full_negotiation;
